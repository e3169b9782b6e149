use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, models::derive_privileges};

/// The resource classes the evaluator can rule on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Category,
    Genre,
    Title,
    Review,
    Comment,
    User,
}

/// The request verb, abstracted away from HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// The evaluator's verdict. A Deny is mapped to Unauthenticated or Forbidden
/// by `check`, depending on whether an actor was present at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// evaluate
///
/// Pure decision function: no IO, no request context beyond its arguments.
/// `owner` is the permission owner of the concrete resource (the `author`
/// field on reviews and comments), resolved by the handler before the call.
///
/// Rules, in priority order:
/// 1. Reads on catalog and review content are public.
/// 2. Catalog writes (Category/Genre/Title) require an elevated actor.
/// 3. Review/Comment update/delete: elevated, staff, or the author.
/// 4. Review/Comment create: any authenticated actor.
/// 5. User management is elevated-only (the `me` sub-resource bypasses the
///    evaluator and applies a field mask instead).
pub fn evaluate(
    actor: Option<&AuthUser>,
    kind: ResourceKind,
    owner: Option<Uuid>,
    action: Action,
) -> Decision {
    let flags = actor.map(|a| derive_privileges(a.role));

    match kind {
        ResourceKind::Category | ResourceKind::Genre | ResourceKind::Title => {
            if action.is_read() {
                return Decision::Allow;
            }
            match flags {
                Some(f) if f.elevated => Decision::Allow,
                _ => Decision::Deny,
            }
        }
        ResourceKind::Review | ResourceKind::Comment => {
            if action.is_read() {
                return Decision::Allow;
            }
            let Some(actor) = actor else {
                return Decision::Deny;
            };
            match action {
                Action::Create => Decision::Allow,
                Action::Update | Action::Delete => {
                    let f = derive_privileges(actor.role);
                    if f.elevated || f.staff || owner == Some(actor.id) {
                        Decision::Allow
                    } else {
                        Decision::Deny
                    }
                }
                // Reads were already allowed above.
                Action::List | Action::Retrieve => Decision::Allow,
            }
        }
        ResourceKind::User => match flags {
            Some(f) if f.elevated => Decision::Allow,
            _ => Decision::Deny,
        },
    }
}

/// check
///
/// Handler-facing wrapper: converts a Deny into the error taxonomy. Missing
/// authentication and insufficient privilege are distinct outcomes with
/// distinct status semantics (401 vs 403).
pub fn check(
    actor: Option<&AuthUser>,
    kind: ResourceKind,
    owner: Option<Uuid>,
    action: Action,
) -> Result<(), ApiError> {
    match evaluate(actor, kind, owner, action) {
        Decision::Allow => Ok(()),
        Decision::Deny if actor.is_none() => Err(ApiError::Unauthenticated),
        Decision::Deny => Err(ApiError::Forbidden),
    }
}
