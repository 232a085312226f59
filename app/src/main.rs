// token-staking-app: command-line front-end for the Token-2022 staking program.
// Renders one view, optionally runs an action on it, and renders it again.

use solana_client::nonblocking::rpc_client::RpcClient;
use token_staking_app::{
    client::ChainClient,
    error::ClientError,
    config::{
        AppConfig, ENV_ADMINS, ENV_CONFIG_FILE, ENV_ENFORCE_ADMIN_GUARD, ENV_KEYPAIR_PATH,
        ENV_PROGRAM_ID, ENV_RPC_URL, ENV_TOKEN_MINT, ENV_TOKEN_PROGRAM,
    },
    layout::Page,
    router::{Route, Router},
    session::Session,
    shell::{Action, App},
    wallet::{KeypairWallet, WalletAdapter},
};

fn print_usage() {
    eprintln!("Usage: token-staking-app [--json] <path> [action [value...]]");
    eprintln!();
    eprintln!("Paths:");
    for route in Route::ALL {
        eprintln!("  {:<24}{}", route.path(), route.title());
    }
    eprintln!();
    eprintln!("Actions:");
    eprintln!("  stake <amount>                  Stake tokens (/stake)");
    eprintln!("  unstake                         Withdraw the unlocked stake (/unstake)");
    eprintln!("  calculate                       Recompute estimated rewards (/claim-rewards)");
    eprintln!("  claim                           Claim rewards (/claim-rewards)");
    eprintln!("  initialize <seconds> <tax%>     Initialize the program (/admin-dashboard)");
    eprintln!("  update-period <seconds>         Set the minimum stake period (/admin-dashboard)");
    eprintln!("  deposit <amount>                Add tokens to the reward pool (/admin-dashboard)");
    eprintln!("  withdraw <amount>               Take tokens from the reward pool (/admin-dashboard)");
    eprintln!("  refresh                         Re-fetch the view");
    eprintln!();
    eprintln!("Environment variables:");
    eprintln!("  {:<28}JSON config file, overridden by the variables below", ENV_CONFIG_FILE);
    eprintln!("  {:<28}Solana RPC URL", ENV_RPC_URL);
    eprintln!("  {:<28}Staking program ID", ENV_PROGRAM_ID);
    eprintln!("  {:<28}Staked token mint", ENV_TOKEN_MINT);
    eprintln!("  {:<28}token-2022 (default), spl-token, or a program ID", ENV_TOKEN_PROGRAM);
    eprintln!("  {:<28}Comma-separated admin addresses", ENV_ADMINS);
    eprintln!("  {:<28}Restrict the admin dashboard to admins (default: true)", ENV_ENFORCE_ADMIN_GUARD);
    eprintln!("  {:<28}Wallet keypair JSON file", ENV_KEYPAIR_PATH);
}

fn print_page(page: &Page, json: bool) {
    if json {
        match serde_json::to_string_pretty(page) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("[ERROR] Failed to serialize page: {}", e),
        }
    } else {
        println!("{}", page);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = match args.iter().position(|a| a == "--json") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        std::process::exit(if args.is_empty() { 1 } else { 0 });
    }
    let path = args.remove(0);
    let action = match args.split_first() {
        Some((name, values)) => match Action::parse(name, values) {
            Ok(action) => Some(action),
            Err(e) => {
                eprintln!("[ERROR] {}", e.user_message());
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => None,
    };

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[CONFIG] {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };
    for warning in &config.warnings {
        eprintln!("[CONFIG] {}", warning);
    }
    if !json {
        println!("=== Token-2022 Staking ===");
        println!("RPC:             {}", config.rpc_url.as_deref().unwrap_or("-"));
        println!(
            "Program:         {}",
            config.program_id.map_or_else(|| "-".to_string(), |k| k.to_string())
        );
        println!(
            "Mint:            {}",
            config.token_mint.map_or_else(|| "-".to_string(), |k| k.to_string())
        );
        println!("Token program:   {}", config.token_program);
        println!(
            "Admin guard:     {} ({} admins)",
            if config.enforce_admin_guard { "enforced" } else { "disabled" },
            config.admins.len()
        );
        println!();
    }

    let client: Option<ChainClient<RpcClient>> = ChainClient::from_config(&config);
    if client.is_none() {
        eprintln!(
            "[CONFIG] {}, {} and {} are required to reach the program",
            ENV_RPC_URL, ENV_PROGRAM_ID, ENV_TOKEN_MINT
        );
    }

    let mut wallet = match &config.keypair_path {
        Some(path) => KeypairWallet::from_file(path).unwrap_or_else(|e| {
            eprintln!("[WALLET] {}", e);
            KeypairWallet::empty()
        }),
        None => KeypairWallet::empty(),
    };
    match wallet.connect() {
        Ok(address) => {
            if !json {
                println!("[WALLET] Connected {}", address);
            }
        }
        Err(_) => eprintln!("[WALLET] No keypair; set {} to connect", ENV_KEYPAIR_PATH),
    }

    let session = Session::new(client, wallet);
    let router = Router::new(config.access_guard());
    let (mut app, nav) = App::start(session, router, &path).await;
    for hop in &nav.redirects {
        eprintln!("[ROUTE] {} -> {}", nav.requested, hop);
    }

    let Some(action) = action else {
        print_page(&app.render(), json);
        return;
    };

    if !json {
        print_page(&app.render(), false);
    }
    let name = action.name();
    match app.dispatch(action).await {
        Ok(Some(signature)) => {
            // Keep stdout clean for --json consumers.
            if json {
                eprintln!("[SUBMIT] {} confirmed: {}", name, signature);
            } else {
                println!("[SUBMIT] {} confirmed: {}", name, signature);
            }
            print_page(&app.render(), json);
        }
        Ok(None) => print_page(&app.render(), json),
        Err(ClientError::Unconfirmed { signature }) => {
            eprintln!("[SUBMIT] {} sent, not confirmed yet: {}", name, signature);
            print_page(&app.render(), json);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("[ERROR] {} failed: {}", name, e.user_message());
            print_page(&app.render(), json);
            std::process::exit(1);
        }
    }
}
