//! Role-based authorization of verified identities

mod authorizer;


pub use authorizer::RoleAuthorizer;
