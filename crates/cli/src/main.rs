//! Mercado CLI - Database migrations and a command-line API client.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! mercado migrate
//!
//! # Create an account and log in (tokens go to .mercado-session.json)
//! mercado register ana ana@example.com s3nha
//! mercado verify-email ana@example.com 123456
//! mercado login ana s3nha
//!
//! # Shop
//! mercado add-saldo 500.00
//! mercado produtos --preco-max 150 --ordenar-por preco
//! mercado compra 1 3
//! mercado transacoes
//! ```
//!
//! # Environment Variables
//!
//! - `MERCADO_BASE_URL` - API base URL (default `http://localhost:3000/api`)
//! - `STOREFRONT_DATABASE_URL` - Database for `migrate` (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mercado_core::{Email, ProductId, Quantity};

use commands::api::{self, ProductQuery, TransactionQuery};
use commands::client::ApiClient;
use commands::session::SessionStore;

mod commands;

#[derive(Parser)]
#[command(name = "mercado")]
#[command(author, version, about = "Mercado CLI tools")]
struct Cli {
    /// API base URL
    #[arg(
        long,
        global = true,
        env = "MERCADO_BASE_URL",
        default_value = "http://localhost:3000/api"
    )]
    base_url: String,

    /// File holding the tokens from `login`
    #[arg(long, global = true, default_value = ".mercado-session.json")]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Create an account
    Register {
        username: String,
        email: Email,
        password: String,
    },
    /// Confirm an email address with the code sent to it
    VerifyEmail { email: Email, code: String },
    /// Log in and save the token pair
    Login { username: String, password: String },
    /// Exchange the saved refresh token for a new access token
    Refresh,
    /// Revoke the saved refresh token and forget the session
    Logout,
    /// Change the logged-in user's password
    AlterarSenha {
        senha_atual: String,
        nova_senha: String,
        /// Defaults to the new password
        #[arg(long)]
        confirmar_senha: Option<String>,
    },
    /// Add to the logged-in user's balance
    AddSaldo {
        /// Amount, e.g. 150.00
        #[arg(allow_hyphen_values = true)]
        saldo: String,
    },
    /// Create a product
    CriarProduto {
        nome: String,
        preco: String,
        estoque: i64,
    },
    /// List products
    Produtos(ProductArgs),
    /// Buy a product
    Compra {
        produto_id: ProductId,
        #[arg(value_parser = parse_quantity)]
        quantidade: Quantity,
        /// Buyer; defaults to the logged-in user
        #[arg(long)]
        username: Option<String>,
    },
    /// List the logged-in user's purchases
    Transacoes(TransactionArgs),
    /// Delete the logged-in user
    DeleteUser,
}

#[derive(Args)]
struct ProductArgs {
    /// Case-insensitive name substring
    #[arg(long)]
    nome: Option<String>,
    /// Maximum price
    #[arg(long)]
    preco_max: Option<String>,
    /// `preco`, `estoque` or `id`
    #[arg(long)]
    ordenar_por: Option<String>,
    #[arg(long)]
    pagina: Option<u32>,
    #[arg(long)]
    itens_por_pagina: Option<u32>,
}

#[derive(Args)]
struct TransactionArgs {
    /// Product name substring
    #[arg(long)]
    produto: Option<String>,
    /// Minimum quantity
    #[arg(long)]
    quantidade_min: Option<String>,
    /// `data`, `total` or `id`
    #[arg(long)]
    ordenar_por: Option<String>,
    #[arg(long)]
    pagina: Option<u32>,
    #[arg(long)]
    itens_por_pagina: Option<u32>,
}

fn parse_quantity(s: &str) -> Result<Quantity, String> {
    let value = s
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("'{s}' is not an integer"))?;
    Quantity::new(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mercado=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Commands::Migrate) {
        commands::migrate::storefront().await?;
        return Ok(());
    }

    let client = ApiClient::new(cli.base_url)?;
    let store = SessionStore::new(cli.session_file);

    match cli.command {
        Commands::Migrate => {}
        Commands::Register {
            username,
            email,
            password,
        } => api::register(&client, &username, &email, &password).await?,
        Commands::VerifyEmail { email, code } => api::verify_email(&client, &email, &code).await?,
        Commands::Login { username, password } => {
            api::login(&client, &store, &username, &password).await?;
        }
        Commands::Refresh => api::refresh(&client, &store).await?,
        Commands::Logout => api::logout(&client, &store).await?,
        Commands::AlterarSenha {
            senha_atual,
            nova_senha,
            confirmar_senha,
        } => {
            let confirm = confirmar_senha.as_deref().unwrap_or(&nova_senha);
            api::change_password(&client, &store, &senha_atual, &nova_senha, confirm).await?;
        }
        Commands::AddSaldo { saldo } => api::add_saldo(&client, &store, &saldo).await?,
        Commands::CriarProduto {
            nome,
            preco,
            estoque,
        } => api::create_product(&client, &store, &nome, &preco, estoque).await?,
        Commands::Produtos(args) => {
            let query = ProductQuery {
                nome: args.nome,
                preco_max: args.preco_max,
                ordenar_por: args.ordenar_por,
                pagina: args.pagina,
                itens_por_pagina: args.itens_por_pagina,
            };
            api::list_products(&client, query).await?;
        }
        Commands::Compra {
            produto_id,
            quantidade,
            username,
        } => {
            api::purchase(&client, &store, username.as_deref(), produto_id, quantidade).await?;
        }
        Commands::Transacoes(args) => {
            let query = TransactionQuery {
                produto: args.produto,
                quantidade_min: args.quantidade_min,
                ordenar_por: args.ordenar_por,
                pagina: args.pagina,
                itens_por_pagina: args.itens_por_pagina,
            };
            api::list_transactions(&client, &store, query).await?;
        }
        Commands::DeleteUser => api::delete_user(&client, &store).await?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3").unwrap(), Quantity::new(3).unwrap());
        assert!(parse_quantity("0").is_err());
        assert!(parse_quantity("abc").is_err());
    }

    #[test]
    fn test_compra_arguments() {
        let cli = Cli::try_parse_from(["mercado", "compra", "7", "3", "--username", "ana"]).unwrap();
        match cli.command {
            Commands::Compra {
                produto_id,
                quantidade,
                username,
            } => {
                assert_eq!(produto_id, ProductId::new(7));
                assert_eq!(quantidade, Quantity::new(3).unwrap());
                assert_eq!(username.as_deref(), Some("ana"));
            }
            _ => panic!("expected compra"),
        }
    }

    #[test]
    fn test_session_file_default() {
        let cli = Cli::try_parse_from(["mercado", "refresh"]).unwrap();
        assert_eq!(cli.session_file, PathBuf::from(".mercado-session.json"));
    }

    #[test]
    fn test_register_rejects_bad_email() {
        assert!(Cli::try_parse_from(["mercado", "register", "ana", "nope", "x"]).is_err());
    }
}
