pub mod metadata;
pub mod notifier;
pub mod request;
pub mod router;
