//! SQLite repositories backing the relay's store traits

pub mod member_repository;
pub mod message_repository;
pub mod user_repository;

pub use member_repository::MemberRepository;
pub use message_repository::MessageRepository;
pub use user_repository::UserRepository;
