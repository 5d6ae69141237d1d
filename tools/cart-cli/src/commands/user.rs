//! User commands.

use anyhow::Result;
use turbo_auth::UserProfile;

use super::UserAddArgs;
use crate::context::Context;

/// Run the user-add command.
pub fn add(args: UserAddArgs, ctx: &Context) -> Result<()> {
    let mut profile = UserProfile::new(&args.name).with_sysadmin(args.sysadmin);
    if let Some(email) = args.email {
        profile = profile.with_email(email);
    }

    let profile = ctx.users.user_create(profile)?;

    if ctx.output.is_json() {
        ctx.output.json(&profile);
        return Ok(());
    }

    ctx.output.success(&format!("Created user {}", profile.name));
    ctx.output.kv("id", profile.id.as_str());
    if profile.sysadmin {
        ctx.output.kv("sysadmin", "yes");
    }
    Ok(())
}
