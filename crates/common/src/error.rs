use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid field `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Duplicate coupon id in catalog: {0}")]
    DuplicateCouponId(u64),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
