use uuid::Uuid;

pub struct SharedUserCreateRequest {
    pub owner_user_id: Uuid,
    pub name: String,
}
