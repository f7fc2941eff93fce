//! Subject and body of the decision email.

use crate::core::models::application::{ApplicationType, Decision};

/// Club-wide values the decision email is branded with.
#[derive(Debug, Clone)]
pub struct Letterhead {
    pub club_name: String,
    pub portal_url: String,
}

pub fn subject(letterhead: &Letterhead, application_type: ApplicationType, board_position: Option<&str>, decision: Decision) -> String {
    let base = &letterhead.club_name;
    let position = board_position.filter(|p| !p.is_empty()).unwrap_or("Board Member");
    match (decision, application_type) {
        (Decision::Accepted, ApplicationType::Board) => format!("Board Application Accepted - {} | {}", position, base),
        (Decision::Accepted, ApplicationType::Project) => format!("Project Application Accepted | {}", base),
        (Decision::Accepted, ApplicationType::Class) => format!("Class Application Accepted | {}", base),
        (Decision::Accepted, ApplicationType::ClubAdmission) => format!("Application Accepted | {}", base),
        (Decision::Rejected, ApplicationType::Board) => format!("Board Application Update - {} | {}", position, base),
        (Decision::Rejected, ApplicationType::Project) => format!("Project Application Update | {}", base),
        (Decision::Rejected, ApplicationType::Class) => format!("Class Application Update | {}", base),
        (Decision::Rejected, ApplicationType::ClubAdmission) => format!("Application Update | {}", base),
    }
}

/// What the applicant applied to, as it reads in a sentence.
pub fn target(letterhead: &Letterhead, application_type: ApplicationType, board_position: Option<&str>) -> String {
    match application_type {
        ApplicationType::Board => board_position.filter(|p| !p.is_empty()).unwrap_or("Board Position").to_owned(),
        ApplicationType::Project => "the project".to_owned(),
        ApplicationType::Class => "the class".to_owned(),
        ApplicationType::ClubAdmission => letterhead.club_name.clone(),
    }
}

pub fn html(letterhead: &Letterhead, application_type: ApplicationType, board_position: Option<&str>, user_name: &str, decision: Decision) -> String {
    let accepted = decision.is_accepted();
    let target = escape(&target(letterhead, application_type, board_position));
    let name = escape(user_name);
    let club = escape(&letterhead.club_name);

    let (title, heading) = if accepted {
        ("Application Accepted", "🎉 Congratulations!")
    } else {
        ("Application Update", "Application Update")
    };

    let outcome = if accepted {
        format!(
            r#"<p style="font-size: 16px;">We're excited to inform you that your application to <strong>{}</strong> has been accepted!</p>"#,
            target
        )
    } else {
        format!(
            r#"<p style="font-size: 16px;">Thank you for your application to <strong>{}</strong>. After careful review, we've decided not to move forward at this time.</p>"#,
            target
        )
    };

    let (list_heading, items) = if accepted {
        let mut items = vec![
            "Check your email for a Slack invitation to join our community".to_owned(),
            "Log in to the members portal to access your dashboard".to_owned(),
            "Attend our next meeting to meet the team".to_owned(),
        ];
        if matches!(application_type, ApplicationType::Project | ApplicationType::Class) {
            items.push("You'll be added to the project/class channel when it starts".to_owned());
        }
        ("Next Steps:", items)
    } else {
        (
            "Stay Involved:",
            vec![
                format!("We encourage you to stay active in {} events", letterhead.club_name),
                "You're welcome to apply again in a future semester".to_owned(),
            ],
        )
    };
    let items: String = items
        .into_iter()
        .map(|item| format!(r#"<li style="margin: 10px 0;">{}</li>"#, escape(&item)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background: linear-gradient(135deg, #FF6B35 0%, #FF8C42 100%); padding: 30px; border-radius: 10px 10px 0 0; text-align: center;">
    <h1 style="color: white; margin: 0; font-size: 28px;">{heading}</h1>
  </div>
  <div style="background: white; padding: 30px; border: 1px solid #e0e0e0; border-top: none; border-radius: 0 0 10px 10px;">
    <p style="font-size: 18px; margin-top: 0;">Hi {name},</p>
    {outcome}
    <div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 25px 0;">
      <h3 style="margin-top: 0; color: #FF6B35;">{list_heading}</h3>
      <ul style="padding-left: 20px;">{items}</ul>
    </div>
    <div style="text-align: center; margin-top: 30px;">
      <a href="{portal}/applications" style="display: inline-block; background: #FF6B35; color: white; padding: 12px 30px; text-decoration: none; border-radius: 6px; font-weight: 600;">Go to Applications</a>
    </div>
    <p style="margin-top: 30px; font-size: 14px; color: #666; border-top: 1px solid #e0e0e0; padding-top: 20px;">
      Questions? Reply to this email or reach out on Slack!<br>
      <strong>{club}</strong>
    </p>
  </div>
</body>
</html>
"#,
        title = title,
        heading = heading,
        name = name,
        outcome = outcome,
        list_heading = list_heading,
        items = items,
        portal = letterhead.portal_url.trim_end_matches('/'),
        club = club,
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
