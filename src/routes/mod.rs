/// Router Module Index
///
/// Organizes the routing surface into access-segregated modules. Public
/// routes carry no middleware; authenticated and admin routes sit behind the
/// auth layer, and the admin handlers additionally run the permission
/// evaluator so a non-elevated actor gets a 403 rather than a missing route.

/// Read-only catalog/review access and the signup/token-exchange flow.
pub mod public;

/// Routes requiring a resolved actor: review/comment writes and the
/// self-service `me` sub-resource.
pub mod authenticated;

/// Catalog writes and user management, restricted to elevated actors by the
/// permission evaluator.
pub mod admin;
