use super::*;
use strand_context::Key;

/// The authenticated user a request is being handled for.
pub struct UserId;

impl Key for UserId {
    type Value = u64;
    const NAME: &'static str = "user_id";
}

/// Binds the configured user id to a request context and handles it.
pub fn run(parent: &Context, config: &settings::Config) -> u64 {
    let ctx = parent.with_value::<UserId>(config.user_id);
    handle_request(&ctx)
}

/// Downstream code reading the user id back out of the context.
///
/// # Panics
///
/// Panics if no [`UserId`] is bound: handling a request for nobody is a
/// programming error, not a recoverable condition.
pub fn handle_request(ctx: &Context) -> u64 {
    let user_id = *ctx
        .value::<UserId>()
        .trace_expect("No user id bound to the request context");

    info!(user_id, "Current user");
    user_id
}
