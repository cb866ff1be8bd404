use friendlist::{Config, hash_password, init_tracing, provision_admin};

const PASSWORD_ENV: &str = "PROVISION_ADMIN_PASSWORD";

fn print_usage(bin_name: &str) {
    eprintln!("Usage: {bin_name} <username>");
    eprintln!("       {bin_name} hash-password");
    eprintln!();
    eprintln!("The password is read from {PASSWORD_ENV}. When it is unset, new admins get a");
    eprintln!("generated password and existing users keep theirs.");
}

fn password_from_env() -> Option<String> {
    std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let mut args = std::env::args();
    let bin_name = args.next().unwrap_or_else(|| "provision-admin".to_string());
    let command = args.next();

    let Some(command) = command.filter(|c| !c.starts_with('-')) else {
        print_usage(&bin_name);
        std::process::exit(2);
    };
    if args.next().is_some() {
        print_usage(&bin_name);
        std::process::exit(2);
    }

    if command == "hash-password" {
        let Some(password) = password_from_env() else {
            eprintln!("{PASSWORD_ENV} must be set to hash a password");
            std::process::exit(2);
        };
        match hash_password(&password) {
            Ok(hash) => println!("{hash}"),
            Err(err) => {
                eprintln!("Hashing failed: {err}");
                std::process::exit(1);
            }
        }
        return;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level, config.logging.json_format);

    let password = password_from_env();
    match provision_admin(&config, &command, password.as_deref()).await {
        Ok(result) => {
            let action = if result.created { "created" } else { "promoted" };
            println!("Administrator '{}' {} (id={})", result.username, action, result.user_id);
            if let Some(generated) = result.generated_password {
                println!("Generated password (shown once): {generated}");
            }
        }
        Err(err) => {
            eprintln!("Provisioning failed: {err}");
            if let Some(source) = std::error::Error::source(&err) {
                eprintln!("  caused by: {source}");
            }
            std::process::exit(1);
        }
    }
}
