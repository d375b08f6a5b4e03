use anyhow::Result;

use crate::commands::Context;
use crate::render::Render;

pub fn add(ctx: &Context, email: &str, nickname: Option<&str>) -> Result<()> {
    let user = ctx.daybook.create_user(email, nickname)?;
    ctx.emit(&user, || format!("Created user {}", user.render()))
}
