//! Client account command handlers.

use tabled::Tabled;

use billdeck_core::{Client, ClientDraft, Workspace};

use crate::cli::{ClientFields, ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "AE")]
    ae: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Client> for ClientRow {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            company: util::or_dash(c.company.as_deref()),
            contact: util::or_dash(c.contact_person.as_deref()),
            ae: util::or_dash(c.account_executive.as_deref()),
            status: util::or_dash(c.status.as_deref()),
        }
    }
}

fn detail(c: &Client) -> String {
    [
        format!("ID:        {}", c.id),
        format!("Name:      {}", c.name),
        format!("Company:   {}", util::or_dash(c.company.as_deref())),
        format!("Industry:  {}", util::or_dash(c.industry.as_deref())),
        format!("Contact:   {}", util::or_dash(c.contact_person.as_deref())),
        format!("Email:     {}", util::or_dash(c.email.as_deref())),
        format!("Phone:     {}", util::or_dash(c.phone.as_deref())),
        format!("AE:        {}", util::or_dash(c.account_executive.as_deref())),
        format!("Status:    {}", util::or_dash(c.status.as_deref())),
    ]
    .join("\n")
}

fn overlay(current: ClientDraft, fields: ClientFields) -> ClientDraft {
    ClientDraft {
        name: fields.name.unwrap_or(current.name),
        company: fields.company.or(current.company),
        industry: fields.industry.or(current.industry),
        contact_person: fields.contact.or(current.contact_person),
        email: fields.email.or(current.email),
        phone: fields.phone.or(current.phone),
        account_executive: fields.account_executive.or(current.account_executive),
        status: fields.status.or(current.status),
    }
}

fn draft_of(c: Client) -> ClientDraft {
    ClientDraft {
        name: c.name,
        company: c.company,
        industry: c.industry,
        contact_person: c.contact_person,
        email: c.email,
        phone: c.phone,
        account_executive: c.account_executive,
        status: c.status,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ws: &Workspace, args: ClientsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List { search } => {
            let mut clients = ws.clients().await?;
            if let Some(needle) = search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                clients.retain(|c| c.matches(needle));
            }
            let out = output::render_list(&global.output, &clients, |c| ClientRow::from(c), |c| c.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { id } => {
            let client = ws.client(&id).await?;
            let out = output::render_single(&global.output, &client, detail, |c| c.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Create(fields) => {
            let draft = overlay(ClientDraft::default(), fields);
            let client = ws.create_client(&draft).await?;
            output::notice(&format!("✓ Client '{}' created", client.name), global.quiet);
            let out = output::render_single(&global.output, &client, detail, |c| c.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Update { id, fields } => {
            let current = ws.client(&id).await?;
            let draft = overlay(draft_of(current), fields);
            let client = ws.update_client(&id, &draft).await?;
            let out = output::render_single(&global.output, &client, detail, |c| c.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
