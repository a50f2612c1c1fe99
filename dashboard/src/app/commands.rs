//! One handler per command; pages are written to `out`, toasts go through
//! the notifier.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use openapi_client::models::{ProjectConfig, ReferenceRecord};
use tracing::{debug, info};

use crate::app::args::{Command, ConnectionArgs, ReferenceAction, USAGE};
use crate::app::state::AppState;
use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::http::ReferenceKind;
use crate::models::events::Outcome;
use crate::realtime::SessionKind;
use crate::session::{follow, follow_request, open, LogStream, SessionEvent};
use crate::utils::version_info;
use crate::views::header::{render_layout, ProjectHeader};
use crate::views::notify::Notification;
use crate::views::project_list::{self, ListState, StatusFilter};
use crate::views::{history, terminal, wizard as wizard_view};
use crate::wizard::steps::missing_fields;
use crate::wizard::{ProjectForm, WizardStep};

pub async fn execute(
    state: &mut AppState,
    command: Command,
    out: &mut dyn Write,
) -> Result<(), DashboardError> {
    debug!("Executing {:?}", command);
    match command {
        Command::Version => {
            writeln!(out, "{}", serde_json::to_string_pretty(&version_info())?)?;
            Ok(())
        }
        Command::Help => {
            writeln!(out, "{}", USAGE)?;
            Ok(())
        }
        Command::List { search, filter } => list(state, search, filter, out).await,
        Command::Show(id) => show(state, &id, out).await,
        Command::Deploy(id) => deploy(state, &id, out).await,
        Command::History(id) => {
            let entries = state.http.project_history(&id).await?;
            writeln!(out, "{}", history::render(&entries))?;
            Ok(())
        }
        Command::Create { file } => create(state, &file, out).await,
        Command::Edit { id, file } => edit(state, &id, &file).await,
        Command::Delete(id) => {
            state.http.delete_project(&id).await?;
            state.notify(Notification::success(format!("Project {} deleted", id)));
            Ok(())
        }
        Command::TestConnection(args) => test_connection(state, args, out).await,
        Command::Reference { kind, action } => reference(state, kind, action, out).await,
        Command::Wizard { file, save_draft } => wizard(state, &file, save_draft, out).await,
        Command::Drafts => drafts(state, out).await,
        Command::Draft(id) => {
            let draft = state.drafts.load(&id).await?;
            writeln!(out, "{}", wizard_view::render_form(&draft.form))?;
            Ok(())
        }
        Command::DeleteDraft(id) => {
            state.drafts.delete(&id).await?;
            state.notify(Notification::success(format!("Draft {} deleted", id)));
            Ok(())
        }
    }
}

async fn list(
    state: &mut AppState,
    search: String,
    filter: StatusFilter,
    out: &mut dyn Write,
) -> Result<(), DashboardError> {
    state.header.navigate("/projects");
    let projects = state.http.list_projects().await?;

    let list_state = ListState {
        query: search,
        status: filter,
    };
    let body = project_list::render(&projects, &list_state);
    writeln!(out, "{}", render_layout(&state.header, &body))?;
    Ok(())
}

async fn show(state: &mut AppState, id: &str, out: &mut dyn Write) -> Result<(), DashboardError> {
    state.header.navigate(format!("/projects/{}", id));
    let project = state.http.get_project(id).await?;

    // Missing history is not worth failing the page for
    let entries = match state.http.project_history(id).await {
        Ok(entries) => entries,
        Err(e) => {
            state.notify(Notification::from_error("Failed to load history", &e));
            Vec::new()
        }
    };

    state
        .header
        .set_header(ProjectHeader::from_project(&project, project.is_deploying()));
    let body = format!(
        "{}\n\n{}",
        terminal::render(&state.log_stream()),
        history::render(&entries)
    );
    writeln!(out, "{}", render_layout(&state.header, &body))?;
    Ok(())
}

async fn deploy(state: &mut AppState, id: &str, out: &mut dyn Write) -> Result<(), DashboardError> {
    let _guard = state.in_flight.acquire(format!("deploy:{}", id))?;

    state.header.navigate(format!("/projects/{}", id));
    let project = state.http.get_project(id).await?;
    state
        .header
        .set_header(ProjectHeader::from_project(&project, true));
    writeln!(out, "{}", state.header.render())?;

    // Listen on a connected socket before asking for the deployment
    let mut stream = state.log_stream();
    if let Err(e) = open(&mut stream, SessionKind::Deployment, id, state.sessions.connect_timeout).await {
        state.header.set_deploying(false);
        return Err(e);
    }
    writeln!(out, "{}", terminal::render_status(&stream))?;

    if let Err(e) = state.http.deploy_project(id).await {
        stream.stop();
        state.header.set_deploying(false);
        return Err(e);
    }
    state.notify(Notification::info(format!(
        "Deployment of {} started",
        project.name()
    )));

    let mut write_error = None;
    let outcome = follow(&mut stream, state.sessions.deployment_timeout, |stream, event| {
        if let Err(e) = write_event(out, stream, event) {
            write_error.get_or_insert(e);
        }
    })
    .await;
    stream.stop();
    state.header.set_deploying(false);
    if let Some(e) = write_error {
        return Err(e.into());
    }

    deployment_result(outcome, state.sessions.deployment_timeout)?;
    state.notify(Notification::success("Deployment successful"));
    Ok(())
}

/// Only a successful deployment exits cleanly
fn deployment_result(outcome: Option<Outcome>, limit: Duration) -> Result<(), DashboardError> {
    match outcome {
        Some(Outcome::Success) => Ok(()),
        Some(Outcome::Failed) => Err(DashboardError::SessionFailed(
            "Deployment failed".to_string(),
        )),
        Some(Outcome::TimedOut) => Err(DashboardError::Timeout(format!(
            "No deployment status after {}s",
            limit.as_secs()
        ))),
        None => Err(DashboardError::RealtimeError(
            "Session ended without a deployment status".to_string(),
        )),
    }
}

fn write_event(
    out: &mut dyn Write,
    stream: &LogStream,
    event: &SessionEvent,
) -> std::io::Result<()> {
    match event {
        SessionEvent::Log(line) => writeln!(out, "{}", terminal::render_line(line)),
        SessionEvent::Connection(_) => writeln!(out, "{}", terminal::render_status(stream)),
        SessionEvent::Status(outcome) => {
            debug!("Terminal status {}", outcome);
            writeln!(out, "{}", terminal::render_status(stream))
        }
        SessionEvent::Ignored => Ok(()),
    }
}

/// Defaults overlaid with a JSON project file
async fn read_form(base: ProjectForm, file: &Path) -> Result<ProjectForm, DashboardError> {
    let record: ProjectConfig = File::new(file).read_json().await?;
    Ok(crate::wizard::merge(&base, &record))
}

async fn create(state: &mut AppState, file: &Path, out: &mut dyn Write) -> Result<(), DashboardError> {
    state.header.navigate("/projects/new");
    let form = read_form(ProjectForm::default(), file).await?;
    form.validate()?;

    let id = state.http.create_project(&form.to_payload()).await?;
    info!("Created project {}", id);
    state.notify(Notification::success("Project created successfully"));
    writeln!(out, "{}", id)?;
    Ok(())
}

async fn edit(state: &mut AppState, id: &str, file: &Path) -> Result<(), DashboardError> {
    state.header.navigate(format!("/projects/{}/edit", id));
    let existing = state.http.get_project(id).await?;
    let form = read_form(ProjectForm::from_record(&existing.config), file).await?;
    form.validate()?;

    state.http.update_project(id, &form.to_payload()).await?;
    state.notify(Notification::success("Project updated successfully"));
    Ok(())
}

async fn test_connection(
    state: &mut AppState,
    args: ConnectionArgs,
    out: &mut dyn Write,
) -> Result<(), DashboardError> {
    let _guard = state.in_flight.acquire("test-connection")?;

    let mut form = ProjectForm::default();
    form.set_field("host", args.host)?;
    form.set_field("username", args.username)?;
    if let Some(port) = args.port {
        form.set_field("port", port)?;
    }
    if let Some(password) = args.password {
        form.set_field("password", password)?;
    }
    if let Some(key_file) = args.key_file {
        let key = tokio::fs::read_to_string(&key_file).await?;
        form.set_field("privateKey", key)?;
    }

    let missing = missing_fields(WizardStep::Credentials, &form);
    if !missing.is_empty() {
        return Err(DashboardError::ValidationError(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let mut stream = state.log_stream();
    open(&mut stream, SessionKind::ConnectionTest, "", state.sessions.connect_timeout).await?;
    writeln!(out, "{}", terminal::render_status(&stream))?;

    let request = form.connection_request();
    let http = state.http.clone();
    let mut write_error = None;
    let response = follow_request(
        &mut stream,
        state.sessions.connection_test_timeout,
        async move { http.test_connection(&request).await },
        |stream, event| {
            if let Err(e) = write_event(out, stream, event) {
                write_error.get_or_insert(e);
            }
        },
    )
    .await;
    stream.stop();
    if let Some(e) = write_error {
        return Err(e.into());
    }

    let message = response?;
    if message.is_success() {
        stream.complete(Outcome::Success);
        state.notify(Notification::success(
            message.message.unwrap_or_else(|| "Connection successful".to_string()),
        ));
        Ok(())
    } else {
        stream.complete(Outcome::Failed);
        let reason = message
            .error
            .or(message.message)
            .unwrap_or_else(|| "unknown reason".to_string());
        Err(DashboardError::SessionFailed(format!("Connection failed: {}", reason)))
    }
}

async fn reference(
    state: &mut AppState,
    kind: ReferenceKind,
    action: ReferenceAction,
    out: &mut dyn Write,
) -> Result<(), DashboardError> {
    match action {
        ReferenceAction::List => {
            let records = state.http.list_reference(kind).await?;
            writeln!(out, "{}", kind.label())?;
            if records.is_empty() {
                writeln!(out, "  (none)")?;
            }
            for record in records {
                writeln!(out, "  {:<10} {}", record.id.as_deref().unwrap_or("-"), record.name)?;
            }
        }
        ReferenceAction::Get(id) => {
            let record = state.http.get_reference(kind, &id).await?;
            writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
        }
        ReferenceAction::Add(name) => {
            let record = state
                .http
                .create_reference(kind, &ReferenceRecord::new(name))
                .await?;
            state.notify(Notification::success(format!("Added {}", record.name)));
        }
        ReferenceAction::Rename { id, name } => {
            let mut record = state.http.get_reference(kind, &id).await?;
            record.name = name;
            state.http.update_reference(kind, &id, &record).await?;
            state.notify(Notification::success(format!("Renamed {} to {}", id, record.name)));
        }
        ReferenceAction::Remove(id) => {
            state.http.delete_reference(kind, &id).await?;
            state.notify(Notification::success(format!("Removed {}", id)));
        }
    }
    Ok(())
}

async fn wizard(
    state: &mut AppState,
    file: &Path,
    save_draft: bool,
    out: &mut dyn Write,
) -> Result<(), DashboardError> {
    state.header.navigate("/projects/new");
    let form = read_form(ProjectForm::default(), file).await?;
    writeln!(out, "{}", render_layout(&state.header, &wizard_view::render_form(&form)))?;

    if save_draft {
        let draft = state.drafts.save(&form, None).await?;
        state.notify(Notification::success(format!("Draft saved: {}", draft.id)));
    }
    Ok(())
}

async fn drafts(state: &mut AppState, out: &mut dyn Write) -> Result<(), DashboardError> {
    let drafts = state.drafts.list().await?;
    if drafts.is_empty() {
        writeln!(out, "No drafts saved.")?;
    }
    for draft in drafts {
        writeln!(
            out,
            "{}  {}  {}",
            draft.id,
            draft.saved_at.format("%Y-%m-%d %H:%M"),
            if draft.form.name.is_empty() { "(unnamed)" } else { draft.form.name.as_str() }
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_result() {
        let limit = Duration::from_secs(600);
        assert!(deployment_result(Some(Outcome::Success), limit).is_ok());

        let failed = deployment_result(Some(Outcome::Failed), limit).unwrap_err();
        assert!(matches!(failed, DashboardError::SessionFailed(_)));
        assert_eq!(failed.to_string(), "Deployment failed");

        let timed_out = deployment_result(Some(Outcome::TimedOut), limit).unwrap_err();
        assert_eq!(timed_out.to_string(), "Timed out: No deployment status after 600s");

        assert!(matches!(
            deployment_result(None, limit),
            Err(DashboardError::RealtimeError(_))
        ));
    }
}
