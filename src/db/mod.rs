pub mod org_repo;
pub use org_repo::OrganizationRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod scoped_repo;
pub use scoped_repo::ScopedEntityRepository;
