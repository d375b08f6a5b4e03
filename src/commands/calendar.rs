use anyhow::Result;
use daybook_core::UserId;

use crate::commands::Context;
use crate::render::{Render, render_list};

pub fn list(ctx: &Context, user: UserId) -> Result<()> {
    let calendars = ctx.daybook.list_calendars(user)?;
    ctx.emit(&calendars, || render_list(&calendars, "No calendars"))
}

pub fn add(ctx: &Context, user: UserId, title: &str) -> Result<()> {
    let calendar = ctx.daybook.create_calendar(user, Some(title))?;
    ctx.emit(&calendar, || format!("Created calendar {}", calendar.render()))
}

pub fn rename(ctx: &Context, user: UserId, title: &str, new_title: &str) -> Result<()> {
    let calendar = ctx.daybook.rename_calendar(user, title, Some(new_title))?;
    ctx.emit(&calendar, || format!("Renamed calendar to {}", calendar.render()))
}

pub fn delete(ctx: &Context, user: UserId, title: &str) -> Result<()> {
    ctx.daybook.delete_calendar(user, title)?;
    if !ctx.json {
        println!("Deleted calendar {title}");
    }
    Ok(())
}
