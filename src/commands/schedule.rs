use anyhow::Result;
use daybook_core::{MemoId, ScheduleId, ScheduleInput, ScheduleQuery, UserId};

use crate::commands::Context;
use crate::render::{Render, render_list};

/// Fields of `daybook schedule add`.
pub struct AddArgs {
    /// Calendar title
    pub calendar: String,
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub repeat: bool,
    pub participants: Vec<UserId>,
    pub memo: Option<MemoId>,
}

pub fn add(ctx: &Context, user: UserId, args: AddArgs) -> Result<()> {
    let calendar = ctx.daybook.get_calendar(user, &args.calendar)?;
    let input = ScheduleInput {
        calendar: Some(calendar.id),
        title: Some(args.title),
        start_date: Some(args.start),
        start_time: args.start_time,
        end_date: args.end,
        end_time: args.end_time,
        is_repeat: args.repeat,
        participants: args.participants,
        memo: args.memo,
    };

    let schedule = ctx.daybook.create_schedule(user, input)?;
    ctx.emit(&schedule, || format!("Created {}", schedule.render()))
}

pub fn list(ctx: &Context, user: UserId, query: &ScheduleQuery) -> Result<()> {
    let page = ctx.daybook.query_schedules(user, query)?;
    ctx.emit(&page, || {
        let mut out = render_list(&page.items, "No schedules");
        if page.total_pages > 1 {
            out.push_str(&format!(
                "\n\nPage {} of {} ({} schedules)",
                page.page, page.total_pages, page.total_items
            ));
        }
        out
    })
}

pub fn show(ctx: &Context, user: UserId, id: ScheduleId) -> Result<()> {
    let schedule = ctx.daybook.get_schedule(user, id)?;
    ctx.emit(&schedule, || schedule.render())
}

pub fn delete(ctx: &Context, user: UserId, id: ScheduleId) -> Result<()> {
    ctx.daybook.delete_schedule(user, id)?;
    if !ctx.json {
        println!("Deleted schedule #{id}");
    }
    Ok(())
}
