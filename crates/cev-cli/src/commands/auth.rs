//! `cev login`, `cev register`, `cev logout` and `cev whoami`

use crate::api::RegisterRequest;
use crate::commands::{datasets, AppContext};
use crate::error::Result;
use crate::routes::Route;
use crate::session::{LOGIN_FAILED, REGISTRATION_FAILED};
use crate::views::to_json;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use inquire::{Password, Text};

fn prompt_text(label: &str, given: Option<String>) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Ok(Text::new(label).prompt()?),
    }
}

fn prompt_password(label: &str, given: Option<String>) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => Ok(Password::new(label).without_confirmation().prompt()?),
    }
}

fn already_logged_in(username: &str) {
    println!(
        "{} Already logged in as {}. Run {} to switch accounts.",
        "ℹ".cyan(),
        username.cyan(),
        "cev logout".cyan()
    );
}

pub async fn login(ctx: &AppContext, username: Option<String>, password: Option<String>) -> Result<()> {
    let (mut gate, route) = ctx.enter(Route::Login).await?;
    if route == Route::Dashboard {
        return match gate.user() {
            Some(user) => {
                already_logged_in(&user.username);
                datasets::show_dashboard(ctx, user, "table").await
            },
            None => Ok(()),
        };
    }

    let username = prompt_text("Username:", username)?;
    let password = prompt_password("Password:", password)?;

    let user = gate
        .login(&username, &password)
        .await
        .map_err(|e| e.with_fallback(LOGIN_FAILED))?;
    ctx.persist_session()?;

    println!("{} Logged in as {}", "✓".green(), user.display_name().cyan());
    println!();
    datasets::show_dashboard(ctx, &user, "table").await
}

pub struct RegisterArgs {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

pub async fn register(ctx: &AppContext, args: RegisterArgs) -> Result<()> {
    let (mut gate, route) = ctx.enter(Route::Register).await?;
    if route == Route::Dashboard {
        return match gate.user() {
            Some(user) => {
                already_logged_in(&user.username);
                datasets::show_dashboard(ctx, user, "table").await
            },
            None => Ok(()),
        };
    }

    let username = prompt_text("Username:", args.username)?;
    let email = prompt_text("Email:", args.email)?;
    let password_given = args.password.is_some();
    let password = prompt_password("Password:", args.password)?;
    let password_confirm = match args.password_confirm {
        Some(confirm) => confirm,
        None if password_given => password.clone(),
        None => prompt_password("Confirm password:", None)?,
    };

    let profile = RegisterRequest {
        username,
        email,
        password,
        password_confirm,
        first_name: args.first_name,
        last_name: args.last_name,
    };

    let result = gate.register(&profile).await;
    // Registration may have set cookies even when the login afterwards failed
    ctx.persist_session()?;

    let user = result.map_err(|e| e.with_fallback(REGISTRATION_FAILED))?;
    println!(
        "{} Account created. Logged in as {}",
        "✓".green(),
        user.display_name().cyan()
    );
    println!();
    datasets::show_dashboard(ctx, &user, "table").await
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    let (mut gate, _) = ctx.enter(Route::Dashboard).await?;
    let was_logged_in = gate.is_authenticated();

    gate.logout().await;
    ctx.clear_session()?;

    if was_logged_in {
        println!("{} Logged out", "✓".green());
    } else {
        println!("{} Not logged in", "ℹ".cyan());
    }
    Ok(())
}

pub async fn whoami(ctx: &AppContext, format: &str) -> Result<()> {
    let user = ctx.require_user(Route::Dashboard).await?;
    ctx.persist_session()?;

    if format == "json" {
        println!("{}", to_json(&user)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    table.add_row(vec!["Username", user.username.as_str()]);
    table.add_row(vec!["Email", user.email.as_str()]);
    table.add_row(vec!["Name", user.display_name().as_str()]);
    table.add_row(vec!["Server", ctx.config.server_url.as_str()]);
    println!("{}", table);
    Ok(())
}
