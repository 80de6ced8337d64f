#![recursion_limit = "256"]

use actix_web::web::{self};

mod routes {
    pub(crate) mod pay;
    pub(crate) mod sub;
}

mod services {
    pub(crate) mod pay;
    pub(crate) mod sub;
}

mod dtos {
    pub(crate) mod sub;
}

pub mod models {
    pub mod sub;
}

pub fn mount_subs() -> actix_web::Scope {
    web::scope("/sub")
        .service(routes::sub::get_status)
        .service(routes::sub::get_plans)
        .service(routes::sub::post_subscribe)
        .service(routes::sub::post_cancel)
        .service(routes::sub::post_resume)
}

pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay").service(routes::pay::post_webhook)
}
