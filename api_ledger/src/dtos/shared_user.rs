use serde::Deserialize;

pub const MAX_NAME_LEN: usize = 60;

#[derive(Debug, Deserialize)]
pub struct SharedUserBody {
    pub name: String,
}

impl SharedUserBody {
    /// Trimmed name, or why it cannot be used.
    pub fn clean_name(&self) -> Result<String, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required");
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err("Name is too long");
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> SharedUserBody {
        SharedUserBody {
            name: name.to_string(),
        }
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(named("  Ana ").clean_name().unwrap(), "Ana");
        assert!(named("   ").clean_name().is_err());
        assert!(named(&"x".repeat(MAX_NAME_LEN + 1)).clean_name().is_err());
        assert!(named(&"é".repeat(MAX_NAME_LEN)).clean_name().is_ok());
    }
}
