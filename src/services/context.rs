use uuid::Uuid;

/// Identity a service call is scoped to.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub user_id: Uuid,
}

impl RequestContext {
    pub fn for_user(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
