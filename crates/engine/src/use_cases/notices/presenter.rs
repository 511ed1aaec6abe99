//! Notice markup for the host chat log.
//!
//! The host adapter wires clicks on `[data-action]` buttons back to
//! `POST /api/notices/{id}/actions` using the ids carried on the root element.

use misrecall_domain::{NoticeAction, NoticeRecord, NoticeState};

use crate::markdown::{escape_html, render};

/// Speaker alias used for notices and shared posts.
pub const NOTICE_TITLE: &str = "Recall Knowledge (False)";

pub fn present(notice: &NoticeRecord) -> String {
    let name = escape_html(&notice.creature_name);

    let body = match notice.state() {
        NoticeState::Loading => format!(
            r#"<div class="fake-info loading">Generating misinformation for {}...</div>"#,
            name
        ),
        NoticeState::Error => format!(
            r#"<div class="fake-info error">{}</div>"#,
            escape_html(notice.error_message().unwrap_or_default())
        ),
        NoticeState::Content => format!(
            r#"<div class="fake-info">{}</div>"#,
            render(notice.last_content().unwrap_or_default())
        ),
    };

    let buttons: Vec<String> = NoticeAction::ALL
        .iter()
        .map(|action| button(*action, notice.allows(*action)))
        .collect();

    let mut attrs = vec![
        format!(r#"data-notice-id="{}""#, notice.id),
        format!(r#"data-creature-id="{}""#, escape_html(notice.creature_id.as_str())),
        format!(r#"data-state="{}""#, state_tag(notice.state())),
        format!(
            r#"data-trigger-type="{}""#,
            notice.trigger.trigger_type.as_str()
        ),
    ];
    if let Some(user_id) = &notice.trigger.user_id {
        attrs.push(format!(r#"data-user-id="{}""#, escape_html(user_id.as_str())));
    }
    if let Some(user_name) = &notice.trigger.user_name {
        attrs.push(format!(r#"data-user-name="{}""#, escape_html(user_name)));
    }

    format!(
        "<div class=\"misrecall-notice\" {}>\n\
         <header><h3>{}</h3><span class=\"creature-name\">{}</span></header>\n\
         {}\n\
         <footer>{}</footer>\n\
         </div>",
        attrs.join(" "),
        NOTICE_TITLE,
        name,
        body,
        buttons.join("")
    )
}

/// Markup for misinformation shared with players.
pub fn present_shared(creature_name: &str, text: &str) -> String {
    format!(
        "<div class=\"misrecall-shared\">\n<header><h3>{}</h3></header>\n{}\n</div>",
        escape_html(creature_name),
        render(text)
    )
}

fn button(action: NoticeAction, enabled: bool) -> String {
    format!(
        r#"<button type="button" data-action="{}"{}>{}</button>"#,
        action.tag(),
        if enabled { "" } else { " disabled" },
        label(action)
    )
}

fn label(action: NoticeAction) -> &'static str {
    match action {
        NoticeAction::Copy => "Copy",
        NoticeAction::Regenerate => "Regenerate",
        NoticeAction::ShareAll => "Share with All",
        NoticeAction::SharePlayer => "Share with Player",
    }
}

fn state_tag(state: NoticeState) -> &'static str {
    match state {
        NoticeState::Loading => "loading",
        NoticeState::Content => "content",
        NoticeState::Error => "error",
    }
}
