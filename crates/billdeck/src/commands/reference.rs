//! Reference data command handlers: users, companies, mediums, settings.

use tabled::Tabled;

use billdeck_core::{Company, Medium, Setting, User, Workspace};

use crate::cli::{GlobalOpts, ReferenceArgs, ReferenceCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            username: u.username.clone(),
            name: util::or_dash(u.full_name.as_deref()),
            email: util::or_dash(u.email.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct NamedRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn setting_value(s: &Setting) -> String {
    match &s.value {
        serde_json::Value::String(v) => v.clone(),
        other => other.to_string(),
    }
}

pub async fn handle(ws: &Workspace, args: ReferenceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let out = match args.command {
        ReferenceCommand::Users => {
            let users = ws.users().await?;
            output::render_list(&global.output, &users, |u| UserRow::from(u), |u| u.username.clone())?
        }
        ReferenceCommand::Companies => {
            let companies: Vec<Company> = ws.companies().await?;
            output::render_list(
                &global.output,
                &companies,
                |c| NamedRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    detail: util::or_dash(c.code.as_deref()),
                },
                |c| c.name.clone(),
            )?
        }
        ReferenceCommand::Mediums => {
            let mediums: Vec<Medium> = ws.mediums().await?;
            output::render_list(
                &global.output,
                &mediums,
                |m| NamedRow {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    detail: util::or_dash(m.description.as_deref()),
                },
                |m| m.name.clone(),
            )?
        }
        ReferenceCommand::Settings => {
            let settings = ws.settings().await?;
            output::render_list(
                &global.output,
                &settings,
                |s| SettingRow {
                    key: s.key.clone(),
                    value: setting_value(s),
                },
                |s| format!("{}={}", s.key, setting_value(s)),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
