//! End-to-end dashboard contract tests: boot the real router on an
//! ephemeral port, drive the page state machines against it through the
//! typed client, and check what the pages display afterwards.

use chrono::{Duration, Utc};
use uuid::Uuid;

use quote_api::auth::hash_password;
use quote_api::{AppState, AppStateInner};
use quote_console::api::{ApiClient, Stat};
use quote_console::notice::GENERIC_FAILURE;
use quote_console::pages::authors::{AuthorDialog, AuthorsPage};
use quote_console::pages::dashboard::DashboardPage;
use quote_console::pages::login::LoginPage;
use quote_console::pages::logs::LogsPage;
use quote_console::pages::password::PasswordPage;
use quote_console::pages::users::{UserDialog, UsersPage};
use quote_console::session::SessionWidget;
use quote_console::Route;
use quote_db::Database;
use quote_types::perms::Permission;
use quote_types::render::{clearance_color, group_lines};

async fn spawn_server() -> (String, AppState) {
    let db = Database::open_in_memory().unwrap();
    let state = AppStateInner::new(db);

    let app = quote_api::router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn seed_user(state: &AppState, name: &str, pass: &str, perms: &[Permission]) -> Uuid {
    let id = Uuid::new_v4();
    let hash = hash_password(pass).unwrap();
    state
        .db
        .create_user(
            &id.to_string(),
            name,
            "28166f",
            &hash,
            Permission::to_bits(perms),
        )
        .unwrap();
    id
}

fn seed_author(state: &AppState, name: &str, obfname: &str) -> Uuid {
    let id = Uuid::new_v4();
    state
        .db
        .create_author(&id.to_string(), name, obfname)
        .unwrap();
    id
}

fn seed_quote(state: &AppState, clearance: i64, stamp: &str, lines: &[(Uuid, &str)]) -> Uuid {
    let id = Uuid::new_v4();
    state
        .db
        .insert_quote(&id.to_string(), None, clearance, 0, stamp)
        .unwrap();
    for (position, (author, content)) in lines.iter().enumerate() {
        state
            .db
            .insert_line(
                &Uuid::new_v4().to_string(),
                &id.to_string(),
                &author.to_string(),
                position as i64,
                content,
            )
            .unwrap();
    }
    id
}

fn now_minus_days(days: i64) -> String {
    (Utc::now() - Duration::days(days))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

async fn signed_in_client(base: &str, name: &str, pass: &str) -> ApiClient {
    let client = ApiClient::new(base).unwrap();
    client.login(name, pass).await.unwrap();
    client
}

// -- Session & lockout --

#[tokio::test]
async fn gated_pages_lock_out_without_a_session() {
    let (base, _state) = spawn_server().await;
    let client = ApiClient::new(&base).unwrap();

    let mut users = UsersPage::new(client.clone());
    users.load().await;
    assert!(users.locked_out());
    assert_eq!(
        users.lockout_message(),
        Some("You must be logged in to access this.")
    );

    let mut authors = AuthorsPage::new(client.clone());
    authors.load().await;
    assert!(authors.locked_out());
    assert_eq!(
        authors.lockout_message(),
        Some("You must be logged in to access this.")
    );

    let mut logs = LogsPage::new(client.clone());
    logs.load().await;
    assert_eq!(logs.error(), Some("Could not fetch logs."));
    assert!(logs.entries().is_empty());

    let mut password = PasswordPage::new(client);
    password.load(Uuid::new_v4()).await;
    assert!(password.locked_out());
    assert!(!password.able_to_edit());
}

#[tokio::test]
async fn login_failure_surfaces_raw_response_text() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);

    let client = ApiClient::new(&base).unwrap();
    let mut login = LoginPage::new(client);
    login.username = "admin".into();
    login.password = "battery-staple".into();

    assert_eq!(login.submit().await, None);
    assert_eq!(login.toaster.latest(), Some("Invalid credentials."));

    login.password = "correct-horse".into();
    assert_eq!(login.submit().await, Some(Route::Landing));
}

#[tokio::test]
async fn logout_clears_identity_and_navigates_away() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    let mut widget = SessionWidget::new(client.clone());
    widget.load().await;
    assert_eq!(widget.signed_in().map(|u| u.name.as_str()), Some("admin"));

    assert_eq!(widget.log_out().await, Route::Landing);
    assert!(widget.signed_in().is_none());

    // the session is gone server-side, not just in the widget
    widget.load().await;
    assert!(widget.signed_in().is_none());
    assert!(client.fetch_self().await.is_err());
}

// -- The list-fetch-mutate-dialog contract --

#[tokio::test]
async fn submission_refetches_whatever_the_server_now_holds() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    let mut page = UsersPage::new(client);
    page.load().await;
    assert!(!page.locked_out());
    assert_eq!(page.listed_users().len(), 1);

    assert!(page.open_create());
    if let Some(UserDialog::Create { name, pass }) = page.dialog_mut() {
        *name = "newcomer".into();
        *pass = "long-enough-pass".into();
    }

    // a concurrent edit lands while the dialog is open; the refetch after
    // submission must pick it up
    seed_user(&state, "bystander", "whatever-pass", &[]);

    page.submit().await;
    assert_eq!(page.toaster.latest(), Some("User successfully created!"));
    assert!(page.dialog().is_none());

    let names: Vec<&str> = page.listed_users().iter().map(|u| u.name.as_str()).collect();
    assert!(names.contains(&"newcomer"));
    assert!(names.contains(&"bystander"));
    assert_eq!(names.first(), Some(&"admin"), "signed-in user renders first");
}

#[tokio::test]
async fn failed_submission_still_refetches_and_closes() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    seed_user(&state, "taken", "whatever-pass", &[]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    let mut page = UsersPage::new(client);
    page.load().await;

    assert!(page.open_create());
    if let Some(UserDialog::Create { name, pass }) = page.dialog_mut() {
        *name = "taken".into(); // conflicts server-side
        *pass = "long-enough-pass".into();
    }

    seed_user(&state, "bystander", "whatever-pass", &[]);
    page.submit().await;

    assert_eq!(page.toaster.latest(), Some(GENERIC_FAILURE));
    assert!(page.dialog().is_none(), "dialog closes regardless of outcome");
    let names: Vec<&str> = page.listed_users().iter().map(|u| u.name.as_str()).collect();
    assert!(names.contains(&"bystander"), "refetch happens regardless");
    assert_eq!(names.iter().filter(|n| **n == "taken").count(), 1);
}

#[tokio::test]
async fn gated_controls_refuse_to_open_and_issue_nothing() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "plain", "whatever-pass", &[Permission::MutateOwnUser]);
    let client = signed_in_client(&base, "plain", "whatever-pass").await;

    let mut authors = AuthorsPage::new(client.clone());
    authors.load().await;
    assert!(!authors.locked_out());

    assert!(!authors.open_new(), "no CreateAuthors, no Everything");
    assert!(authors.dialog().is_none());
    authors.submit().await; // no dialog -> no request
    assert!(authors.toaster.latest().is_none());
    assert_eq!(state.db.count_authors().unwrap(), 0);

    let mut users = UsersPage::new(client);
    users.load().await;
    assert!(!users.open_create());
    let me = users.current_user().unwrap().id;
    assert!(!users.open_delete(me), "self-deletion is never offered");
}

#[tokio::test]
async fn renaming_yourself_updates_the_displayed_identity() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    let mut page = UsersPage::new(client);
    page.load().await;
    let me = page.current_user().unwrap().id;

    assert!(page.open_rename(me));
    if let Some(UserDialog::EditName { name, .. }) = page.dialog_mut() {
        assert_eq!(name, "admin", "dialog seeds from the selected entity");
        *name = "root".into();
    }
    page.submit().await;

    assert_eq!(page.toaster.latest(), Some("Username changed successfully!"));
    assert_eq!(page.current_user().unwrap().name, "root");
}

// -- Authors page --

#[tokio::test]
async fn author_lifecycle_through_the_dialog() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    let mut page = AuthorsPage::new(client);
    page.load().await;

    assert!(page.open_new());
    if let Some(AuthorDialog::New { name, obfname }) = page.dialog_mut() {
        *name = "Margaret".into();
        *obfname = "Raven".into();
    }
    page.submit().await;
    assert_eq!(page.toaster.latest(), Some("Author added successfully!"));
    assert_eq!(page.authors().len(), 1);
    assert_eq!(page.authors()[0].quotecount, 0);
    let id = page.authors()[0].id;

    assert!(page.open_rename(id));
    if let Some(AuthorDialog::Rename { name, .. }) = page.dialog_mut() {
        assert_eq!(name, "Margaret");
        *name = "Peggy".into();
    }
    page.submit().await;
    assert_eq!(page.authors()[0].name, "Peggy");
    assert_eq!(page.authors()[0].obfname, "Raven", "codename untouched");

    assert!(page.open_recodename(id));
    if let Some(AuthorDialog::Recodename { obfname, .. }) = page.dialog_mut() {
        *obfname = "Crow".into();
    }
    page.submit().await;
    assert_eq!(page.authors()[0].obfname, "Crow");

    assert!(page.open_delete(id));
    page.submit().await;
    assert_eq!(page.toaster.latest(), Some("Author deleted."));
    assert!(page.authors().is_empty());
}

#[tokio::test]
async fn quoted_author_resists_deletion() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    let author = seed_author(&state, "Margaret", "Raven");
    seed_quote(&state, 0, &now_minus_days(1), &[(author, "hello")]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    let mut page = AuthorsPage::new(client);
    page.load().await;
    assert_eq!(page.authors()[0].linecount, 1);

    assert!(page.open_delete(author));
    page.submit().await;

    assert_eq!(page.toaster.latest(), Some(GENERIC_FAILURE));
    assert_eq!(page.authors().len(), 1, "the author is still there");
}

// -- Password rules --

#[tokio::test]
async fn password_grant_stops_at_everything_holders() {
    let (base, state) = spawn_server().await;
    let admin = seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    seed_user(
        &state,
        "keymaster",
        "keymaster-pass",
        &[Permission::MutateUsersPasswords],
    );
    let plain = seed_user(&state, "plain", "whatever-pass", &[]);
    let client = signed_in_client(&base, "keymaster", "keymaster-pass").await;

    let mut page = PasswordPage::new(client.clone());
    page.load(plain).await;
    assert!(page.able_to_edit());
    page.new_pass = "replacement-pass".into();
    assert_eq!(page.submit().await, Some(Route::Users));
    assert_eq!(page.toaster.latest(), Some("Password changed!"));

    // the target's old credentials no longer work, the new ones do
    let probe = ApiClient::new(&base).unwrap();
    assert!(probe.login("plain", "whatever-pass").await.is_err());
    assert!(probe.login("plain", "replacement-pass").await.is_ok());

    // an Everything holder is out of the keymaster's reach
    let mut page = PasswordPage::new(client);
    page.load(admin).await;
    assert!(!page.able_to_edit());
    assert_eq!(page.submit().await, None, "refused gate issues no request");
}

#[tokio::test]
async fn changing_your_own_password_ends_your_session() {
    let (base, state) = spawn_server().await;
    let me = seed_user(
        &state,
        "plain",
        "whatever-pass",
        &[Permission::MutateOwnUser],
    );
    let client = signed_in_client(&base, "plain", "whatever-pass").await;

    let mut page = PasswordPage::new(client.clone());
    page.load(me).await;
    assert!(page.able_to_edit());
    page.new_pass = "replacement-pass".into();
    assert_eq!(page.submit().await, Some(Route::Login));

    assert!(client.fetch_self().await.is_err(), "session was destroyed");
}

// -- Dashboard & quotes --

#[tokio::test]
async fn stat_cards_resolve_independently() {
    let (base, state) = spawn_server().await;
    let author = seed_author(&state, "Margaret", "Raven");
    seed_author(&state, "Silent", "Ghost");
    seed_quote(&state, 0, &now_minus_days(2), &[(author, "recent")]);
    seed_quote(&state, 0, &now_minus_days(20), &[(author, "older")]);
    seed_quote(&state, 0, &now_minus_days(90), &[(author, "ancient")]);

    let mut page = DashboardPage::new(ApiClient::new(&base).unwrap());
    assert_eq!(page.card(Stat::QuoteCount), "...");
    page.load().await;

    assert_eq!(page.card(Stat::QuoteCount), "3");
    assert_eq!(page.card(Stat::WeeklyQuoteCount), "1");
    assert_eq!(page.card(Stat::MonthlyQuoteCount), "2");
    assert_eq!(page.card(Stat::QuotedAuthorCount), "1");
    assert_eq!(page.card(Stat::UserCount), "0");

    let featured = page.featured().expect("public quotes exist");
    assert_eq!(featured.runs.len(), 1);
    assert_eq!(featured.runs[0].author_label, "— Margaret");
}

#[tokio::test]
async fn random_public_quote_groups_lines_by_author() {
    let (base, state) = spawn_server().await;
    let ada = seed_author(&state, "Ada", "Raven");
    let bob = seed_author(&state, "Bob", "Sparrow");
    seed_quote(
        &state,
        0,
        &now_minus_days(1),
        &[(ada, "first"), (ada, "second"), (bob, "third")],
    );
    // a cleared quote must never surface here
    seed_quote(&state, 200, &now_minus_days(1), &[(bob, "secret")]);

    let client = ApiClient::new(&base).unwrap();
    for _ in 0..5 {
        let quote = client.random_public_quote().await.unwrap();
        assert_eq!(quote.clearance, 0);

        let runs = group_lines(&quote.lines);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].lines.len(), 2);
        assert_eq!(runs[0].author.name, "Ada");
        assert_eq!(runs[1].author.name, "Bob");
        assert_eq!(clearance_color(quote.clearance as i64), "hsl(100, 45%, 50%)");
    }
}

// -- Logs --

#[tokio::test]
async fn logs_page_renders_labels_and_details() {
    let (base, state) = spawn_server().await;
    seed_user(&state, "admin", "correct-horse", &[Permission::Everything]);
    let client = signed_in_client(&base, "admin", "correct-horse").await;

    // produce some audit entries through the dashboard itself
    let mut authors = AuthorsPage::new(client.clone());
    authors.load().await;
    assert!(authors.open_new());
    if let Some(AuthorDialog::New { name, obfname }) = authors.dialog_mut() {
        *name = "Margaret".into();
        *obfname = "Raven".into();
    }
    authors.submit().await;

    let mut users = UsersPage::new(client.clone());
    users.load().await;
    let me = users.current_user().unwrap().id;
    assert!(users.open_recolor(me));
    if let Some(UserDialog::EditColor { color, .. }) = users.dialog_mut() {
        *color = "a1b2c3".into();
    }
    users.submit().await;

    let mut logs = LogsPage::new(client.clone());
    logs.load().await;
    assert!(logs.error().is_none());

    let rendered = logs.rendered();
    let labels: Vec<&str> = rendered.iter().map(|log| log.label).collect();
    assert!(labels.contains(&"AuthorCreated"));
    assert!(labels.contains(&"UserColorUpdated"));

    let recolor = rendered
        .iter()
        .find(|log| log.label == "UserColorUpdated")
        .unwrap();
    let details = recolor.details.as_deref().unwrap();
    assert!(details.contains("a1b2c3"));

    // an empty page is a failed fetch as far as the page is concerned
    assert!(client.fetch_logs(50, 99).await.is_err());
}
