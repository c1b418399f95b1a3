use anchor_lang::{AccountDeserialize, Discriminator};
use anyhow::{anyhow, Context, Result};
use borsh::BorshSerialize;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use solana_sdk::system_program;
use solana_sdk::sysvar;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token_2022::extension::StateWithExtensions;
use spl_token_2022::state::{Account as TokenAccountState, Mint as MintState};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use ztoken::state::{FrozenAccount, TokenMetadata, Ztoken};
use ztoken::utils::{find_frozen_pda, find_metadata_pda, find_registry_pda};

#[derive(Parser)]
#[command(name = "ztoken", version, about = "ztoken registry CLI")]
struct Cli {
    #[arg(long)]
    cluster: Option<String>,

    #[arg(long)]
    keypair: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[arg(long, value_enum, default_value = "legacy")]
    token_program: TokenProgram,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum TokenProgram {
    Legacy,
    Token2022,
}

impl TokenProgram {
    fn id(self) -> Pubkey {
        match self {
            TokenProgram::Legacy => spl_token::id(),
            TokenProgram::Token2022 => spl_token_2022::id(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    Init,
    CreateMint(CreateMintArgs),
    Ata(AtaArgs),
    Transfer(TransferArgs),
    MintTo(MintToArgs),
    Freeze(AddressArgs),
    Unfreeze(AddressArgs),
    Frozen(AddressArgs),
    Status,
    Token(TokenArgs),
    Tokens,
    Balance(BalanceArgs),
}

#[derive(Parser)]
struct CreateMintArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    symbol: Option<String>,

    /// Defaults to 6.
    #[arg(long)]
    decimals: Option<u8>,

    #[arg(long)]
    supply: Option<String>,
}

#[derive(Parser)]
struct AtaArgs {
    #[command(subcommand)]
    command: AtaCmd,
}

#[derive(Subcommand)]
enum AtaCmd {
    Create(AtaCreateArgs),
    Close(MintOnlyArgs),
}

#[derive(Parser)]
struct AtaCreateArgs {
    /// Owner of the account; defaults to the payer.
    owner: Option<String>,

    #[arg(long)]
    mint: Option<String>,
}

#[derive(Parser)]
struct TransferArgs {
    recipient: String,
    amount: String,

    /// Source token account; defaults to the payer's associated account.
    #[arg(long)]
    from: Option<String>,

    #[arg(long)]
    mint: Option<String>,
}

#[derive(Parser)]
struct MintToArgs {
    recipient: String,
    amount: String,

    /// Registry id of the token; looked up by mint when omitted.
    #[arg(long)]
    id: Option<u64>,

    #[arg(long)]
    mint: Option<String>,
}

#[derive(Parser)]
struct AddressArgs {
    address: String,
}

#[derive(Parser)]
struct MintOnlyArgs {
    #[arg(long)]
    mint: Option<String>,
}

#[derive(Parser)]
struct TokenArgs {
    id: u64,
}

#[derive(Parser)]
struct BalanceArgs {
    owner: Option<String>,

    #[arg(long)]
    mint: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let solana_config = load_solana_cli_config().ok();

    match &cli.command {
        Commands::Init => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_init(&ctx)
        }
        Commands::CreateMint(args) => {
            let config_file = args
                .config
                .as_ref()
                .map(|path| load_ztoken_config(path))
                .transpose()?;
            let network_override = config_file.as_ref().and_then(|cfg| cfg.network.as_ref());
            let ctx = build_context(&cli, solana_config.as_ref(), network_override)?;
            handle_create_mint(&ctx, args, config_file.as_ref())
        }
        Commands::Ata(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_ata(&ctx, &args.command)
        }
        Commands::Transfer(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_transfer(&ctx, args)
        }
        Commands::MintTo(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_mint_to(&ctx, args)
        }
        Commands::Freeze(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_freeze(&ctx, args, true)
        }
        Commands::Unfreeze(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_freeze(&ctx, args, false)
        }
        Commands::Frozen(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_frozen(&ctx, args)
        }
        Commands::Status => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_status(&ctx)
        }
        Commands::Token(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_token(&ctx, args)
        }
        Commands::Tokens => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_tokens(&ctx)
        }
        Commands::Balance(args) => {
            let ctx = build_context(&cli, solana_config.as_ref(), None)?;
            handle_balance(&ctx, args)
        }
    }
}

#[derive(Debug, Clone)]
struct ClusterInfo {
    url: String,
    label: Option<String>,
}

#[derive(Clone, Copy)]
struct AppContext<'a> {
    client: &'a RpcClient,
    payer: &'a Keypair,
    output: OutputFormat,
    token_program: Pubkey,
    cluster: &'a ClusterInfo,
}

struct OwnedContext {
    client: RpcClient,
    payer: Keypair,
    output: OutputFormat,
    token_program: Pubkey,
    cluster: ClusterInfo,
}

impl OwnedContext {
    fn as_ref(&self) -> AppContext<'_> {
        AppContext {
            client: &self.client,
            payer: &self.payer,
            output: self.output,
            token_program: self.token_program,
            cluster: &self.cluster,
        }
    }
}

fn build_context(
    cli: &Cli,
    solana_config: Option<&SolanaCliConfig>,
    network_override: Option<&NetworkConfig>,
) -> Result<OwnedContext> {
    let cluster_value = if let Some(value) = cli.cluster.as_deref() {
        value.to_string()
    } else if let Some(value) = network_override.and_then(|cfg| cfg.cluster.as_deref()) {
        value.to_string()
    } else if let Some(config) = solana_config {
        config.json_rpc_url.clone()
    } else {
        "devnet".to_string()
    };

    let cluster = resolve_cluster(&cluster_value)?;

    let keypair_value = if let Some(value) = cli.keypair.as_deref() {
        value.to_string()
    } else if let Some(value) = network_override.and_then(|cfg| cfg.keypair_path.as_deref()) {
        value.to_string()
    } else if let Some(config) = solana_config {
        config.keypair_path.clone()
    } else {
        return Err(anyhow!(
            "Missing keypair path. Use --keypair or Solana CLI config."
        ));
    };

    let commitment_value = network_override
        .and_then(|cfg| cfg.commitment.clone())
        .or_else(|| solana_config.and_then(|cfg| cfg.commitment.clone()));
    let commitment = parse_commitment(commitment_value.as_deref());

    let keypair_path = expand_tilde(&keypair_value);
    let payer = read_keypair_file(&keypair_path)
        .map_err(|err| anyhow!("Failed to read keypair: {}", err))?;

    let client = RpcClient::new_with_commitment(cluster.url.clone(), commitment);

    Ok(OwnedContext {
        client,
        payer,
        output: cli.output,
        token_program: cli.token_program.id(),
        cluster,
    })
}

fn handle_init(ctx: &OwnedContext) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let registry = find_registry_pda(&ztoken::ID).0;
    let ix = build_initialize_instruction(ctx_ref.payer.pubkey(), registry);
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);

    if ctx_ref.output == OutputFormat::Json {
        print_json(&InitOutput {
            registry: registry.to_string(),
            signature,
            explorer,
        })
    } else {
        println!("Registry initialized");
        println!("Registry: {}", registry);
        print_signature(&signature, explorer);
        Ok(())
    }
}

fn handle_create_mint(
    ctx: &OwnedContext,
    args: &CreateMintArgs,
    config: Option<&ZtokenConfig>,
) -> Result<()> {
    let token = resolve_token_config(args, config)?;
    let decimals = token.decimals.unwrap_or(6);
    let init_supply = match token.initial_supply.as_deref() {
        Some(value) => parse_amount(value, decimals)?,
        None => 0,
    };

    let ctx_ref = ctx.as_ref();
    let registry_pda = find_registry_pda(&ztoken::ID).0;
    let registry = fetch_registry(ctx_ref, &registry_pda)?;
    let id = registry.count;
    let metadata_pda = find_metadata_pda(id, &ztoken::ID).0;

    let mint_keypair = Keypair::new();
    let token_account_keypair = Keypair::new();

    let ix = build_create_mint_instruction(CreateMintParams {
        payer: ctx_ref.payer.pubkey(),
        mint: mint_keypair.pubkey(),
        token_account: token_account_keypair.pubkey(),
        metadata_pda,
        registry_pda,
        token_program: ctx_ref.token_program,
        name: token.name.clone(),
        symbol: token.symbol.clone(),
        decimals,
        init_supply,
    })?;
    let signature = send_transaction(
        ctx_ref,
        vec![ix],
        vec![&mint_keypair, &token_account_keypair],
    )?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);

    if ctx_ref.output == OutputFormat::Json {
        print_json(&CreateMintOutput {
            id,
            mint: mint_keypair.pubkey().to_string(),
            token_account: token_account_keypair.pubkey().to_string(),
            metadata: metadata_pda.to_string(),
            signature,
            explorer,
        })
    } else {
        println!("Token created");
        println!("Id:            {}", id);
        println!("Name:          {} ({})", token.name, token.symbol);
        println!("Mint:          {}", mint_keypair.pubkey());
        println!("Token account: {}", token_account_keypair.pubkey());
        println!("Metadata:      {}", metadata_pda);
        println!("Supply:        {}", format_amount(init_supply, decimals));
        print_signature(&signature, explorer);
        Ok(())
    }
}

fn resolve_token_config(args: &CreateMintArgs, config: Option<&ZtokenConfig>) -> Result<TokenConfig> {
    if let Some(config) = config {
        if args.name.is_some()
            || args.symbol.is_some()
            || args.decimals.is_some()
            || args.supply.is_some()
        {
            return Err(anyhow!(
                "--config cannot be combined with --name, --symbol, --decimals or --supply"
            ));
        }
        return Ok(config.token.clone());
    }

    Ok(TokenConfig {
        name: args
            .name
            .clone()
            .ok_or_else(|| anyhow!("--name is required without --config"))?,
        symbol: args
            .symbol
            .clone()
            .ok_or_else(|| anyhow!("--symbol is required without --config"))?,
        decimals: args.decimals,
        initial_supply: args.supply.clone(),
    })
}

fn handle_ata(ctx: &OwnedContext, cmd: &AtaCmd) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    match cmd {
        AtaCmd::Create(args) => {
            let mint = resolve_mint(&args.mint)?;
            let owner = match args.owner.as_deref() {
                Some(value) => parse_pubkey(value)?,
                None => ctx_ref.payer.pubkey(),
            };
            let ata =
                get_associated_token_address_with_program_id(&owner, &mint, &ctx_ref.token_program);
            let ix = build_create_or_get_ata_instruction(
                ctx_ref.payer.pubkey(),
                owner,
                mint,
                ata,
                ctx_ref.token_program,
            );
            let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
            let explorer = explorer_url(&signature, ctx_ref.cluster);
            if ctx_ref.output == OutputFormat::Json {
                print_json(&AtaOutput {
                    owner: owner.to_string(),
                    ata: ata.to_string(),
                    signature,
                    explorer,
                })
            } else {
                println!("Token account for {}: {}", owner, ata);
                print_signature(&signature, explorer);
                Ok(())
            }
        }
        AtaCmd::Close(args) => {
            let mint = resolve_mint(&args.mint)?;
            let owner = ctx_ref.payer.pubkey();
            let ata =
                get_associated_token_address_with_program_id(&owner, &mint, &ctx_ref.token_program);
            let ix = build_close_ata_instruction(owner, ata, ctx_ref.token_program);
            let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
            let explorer = explorer_url(&signature, ctx_ref.cluster);
            if ctx_ref.output == OutputFormat::Json {
                print_json(&SimpleOutput {
                    signature,
                    explorer,
                })
            } else {
                println!("Closed token account: {}", ata);
                print_signature(&signature, explorer);
                Ok(())
            }
        }
    }
}

fn handle_transfer(ctx: &OwnedContext, args: &TransferArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let mint = resolve_mint(&args.mint)?;
    let decimals = fetch_mint_decimals(ctx_ref, &mint)?;
    let amount = parse_amount(&args.amount, decimals)?;
    let sender = ctx_ref.payer.pubkey();
    let recipient = parse_pubkey(&args.recipient)?;

    let from_ata = match args.from.as_deref() {
        Some(value) => parse_pubkey(value)?,
        None => get_associated_token_address_with_program_id(&sender, &mint, &ctx_ref.token_program),
    };
    let to_ata =
        get_associated_token_address_with_program_id(&recipient, &mint, &ctx_ref.token_program);

    let mut instructions = Vec::new();
    if fetch_optional_account(ctx_ref, &to_ata)?.is_none() {
        instructions.push(build_create_or_get_ata_instruction(
            sender,
            recipient,
            mint,
            to_ata,
            ctx_ref.token_program,
        ));
    }

    let frozen_account = existing_frozen_pda(ctx_ref, &sender)?;
    let recipient_frozen_account = existing_frozen_pda(ctx_ref, &recipient)?;
    instructions.push(build_transfer_instruction(TransferParams {
        from_authority: sender,
        from_ata,
        to_ata,
        mint,
        token_program: ctx_ref.token_program,
        frozen_account,
        recipient_frozen_account,
        amount,
    })?);

    let signature = send_transaction(ctx_ref, instructions, vec![])?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&SimpleOutput {
            signature,
            explorer,
        })
    } else {
        println!(
            "Transferred {} tokens to {}",
            format_amount(amount, decimals),
            recipient
        );
        print_signature(&signature, explorer);
        Ok(())
    }
}

fn handle_mint_to(ctx: &OwnedContext, args: &MintToArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let mint = resolve_mint(&args.mint)?;
    let (metadata_pda, metadata) = match args.id {
        Some(id) => {
            let pda = find_metadata_pda(id, &ztoken::ID).0;
            let metadata = fetch_metadata(ctx_ref, &pda)?
                .ok_or_else(|| anyhow!("Token {} not found", id))?;
            (pda, metadata)
        }
        None => find_metadata_by_mint(ctx_ref, &mint)?
            .ok_or_else(|| anyhow!("No registered token for mint {}", mint))?,
    };
    if metadata.mint != mint {
        return Err(anyhow!("Token {} is not backed by mint {}", metadata.id, mint));
    }

    let amount = parse_amount(&args.amount, metadata.decimals)?;
    let recipient = parse_pubkey(&args.recipient)?;
    let to_ata =
        get_associated_token_address_with_program_id(&recipient, &mint, &ctx_ref.token_program);

    let mut instructions = Vec::new();
    if fetch_optional_account(ctx_ref, &to_ata)?.is_none() {
        instructions.push(build_create_or_get_ata_instruction(
            ctx_ref.payer.pubkey(),
            recipient,
            mint,
            to_ata,
            ctx_ref.token_program,
        ));
    }
    instructions.push(build_mint_to_instruction(MintToParams {
        authority: ctx_ref.payer.pubkey(),
        mint,
        to_ata,
        token_program: ctx_ref.token_program,
        metadata_pda,
        amount,
    })?);

    let signature = send_transaction(ctx_ref, instructions, vec![])?;
    let supply = ctx_ref.client.get_token_supply(&mint)?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&MintOutput {
            signature,
            explorer,
            new_supply: supply.amount,
        })
    } else {
        println!(
            "Minted {} {} to {}",
            format_amount(amount, metadata.decimals),
            metadata.symbol,
            recipient
        );
        println!("New supply: {}", supply.amount);
        print_signature(&signature, explorer);
        Ok(())
    }
}

fn handle_freeze(ctx: &OwnedContext, args: &AddressArgs, freeze: bool) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let target = parse_pubkey(&args.address)?;
    let frozen_pda = find_frozen_pda(&target, &ztoken::ID).0;
    let ix = build_freeze_instruction(FreezeParams {
        authority: ctx_ref.payer.pubkey(),
        frozen_pda,
        target,
        freeze,
    });
    let signature = send_transaction(ctx_ref, vec![ix], vec![])?;
    let explorer = explorer_url(&signature, ctx_ref.cluster);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&SimpleOutput {
            signature,
            explorer,
        })
    } else {
        if freeze {
            println!("Frozen account: {}", target);
        } else {
            println!("Unfrozen account: {}", target);
        }
        println!("Record: {}", frozen_pda);
        print_signature(&signature, explorer);
        Ok(())
    }
}

fn handle_frozen(ctx: &OwnedContext, args: &AddressArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let target = parse_pubkey(&args.address)?;
    let frozen_pda = find_frozen_pda(&target, &ztoken::ID).0;
    let record = fetch_frozen_account(ctx_ref, &frozen_pda)?;
    let is_frozen = record.as_ref().map(|entry| entry.is_frozen).unwrap_or(false);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&FrozenOutput {
            account: target.to_string(),
            is_frozen,
            updated_by: record.map(|entry| entry.updated_by.to_string()),
        })
    } else {
        if is_frozen {
            println!("Frozen: {}", target);
        } else {
            println!("Not frozen: {}", target);
        }
        Ok(())
    }
}

fn handle_status(ctx: &OwnedContext) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let registry_pda = find_registry_pda(&ztoken::ID).0;
    let registry = fetch_registry(ctx_ref, &registry_pda)?;
    if ctx_ref.output == OutputFormat::Json {
        print_json(&StatusOutput {
            registry: registry_pda.to_string(),
            admin: registry.admin.to_string(),
            token_count: registry.count,
        })
    } else {
        println!("Registry: {}", registry_pda);
        println!("Admin:    {}", registry.admin);
        println!("Tokens:   {}", registry.count);
        Ok(())
    }
}

fn handle_token(ctx: &OwnedContext, args: &TokenArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let pda = find_metadata_pda(args.id, &ztoken::ID).0;
    let metadata =
        fetch_metadata(ctx_ref, &pda)?.ok_or_else(|| anyhow!("Token {} not found", args.id))?;
    let info = TokenInfo::new(&pda, &metadata);
    if ctx_ref.output == OutputFormat::Json {
        print_json(&info)
    } else {
        print_token(&info);
        Ok(())
    }
}

fn handle_tokens(ctx: &OwnedContext) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let registry = fetch_registry(ctx_ref, &find_registry_pda(&ztoken::ID).0)?;
    let mut tokens = Vec::new();
    for id in 0..registry.count {
        let pda = find_metadata_pda(id, &ztoken::ID).0;
        if let Some(metadata) = fetch_metadata(ctx_ref, &pda)? {
            tokens.push(TokenInfo::new(&pda, &metadata));
        }
    }

    if ctx_ref.output == OutputFormat::Json {
        print_json(&TokensOutput { tokens })
    } else {
        if tokens.is_empty() {
            println!("No tokens found");
        }
        for info in &tokens {
            print_token(info);
        }
        Ok(())
    }
}

fn handle_balance(ctx: &OwnedContext, args: &BalanceArgs) -> Result<()> {
    let ctx_ref = ctx.as_ref();
    let mint = resolve_mint(&args.mint)?;
    let owner = match args.owner.as_deref() {
        Some(value) => parse_pubkey(value)?,
        None => ctx_ref.payer.pubkey(),
    };
    let ata = get_associated_token_address_with_program_id(&owner, &mint, &ctx_ref.token_program);
    let decimals = fetch_mint_decimals(ctx_ref, &mint)?;
    let amount = match fetch_optional_account(ctx_ref, &ata)? {
        Some(account) => {
            StateWithExtensions::<TokenAccountState>::unpack(&account.data)
                .map_err(|err| anyhow!("Failed to decode token account: {}", err))?
                .base
                .amount
        }
        None => 0,
    };
    if ctx_ref.output == OutputFormat::Json {
        print_json(&BalanceOutput {
            owner: owner.to_string(),
            token_account: ata.to_string(),
            amount,
        })
    } else {
        println!("{} {}", owner, format_amount(amount, decimals));
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ZtokenConfig {
    token: TokenConfig,
    network: Option<NetworkConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TokenConfig {
    name: String,
    symbol: String,
    decimals: Option<u8>,
    initial_supply: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct NetworkConfig {
    cluster: Option<String>,
    keypair_path: Option<String>,
    commitment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SolanaCliConfig {
    json_rpc_url: String,
    keypair_path: String,
    commitment: Option<String>,
}

fn load_ztoken_config(path: &str) -> Result<ZtokenConfig> {
    let contents = fs::read_to_string(expand_tilde(path))
        .with_context(|| format!("Failed to read config: {}", path))?;
    parse_ztoken_config(&contents)
}

fn parse_ztoken_config(contents: &str) -> Result<ZtokenConfig> {
    toml::from_str(contents).context("Failed to parse config")
}

fn load_solana_cli_config() -> Result<SolanaCliConfig> {
    let path = default_solana_config_path();
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read Solana config: {}", path.display()))?;
    serde_yaml::from_str(&contents).context("Failed to parse Solana config")
}

fn default_solana_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("solana");
    path.push("cli");
    path.push("config.yml");
    path
}

fn resolve_cluster(input: &str) -> Result<ClusterInfo> {
    let lowered = input.to_lowercase();
    let (url, label) = match lowered.as_str() {
        "devnet" => (
            "https://api.devnet.solana.com".to_string(),
            Some("devnet".to_string()),
        ),
        "testnet" => (
            "https://api.testnet.solana.com".to_string(),
            Some("testnet".to_string()),
        ),
        "mainnet" | "mainnet-beta" => (
            "https://api.mainnet-beta.solana.com".to_string(),
            Some("mainnet-beta".to_string()),
        ),
        "localnet" | "localhost" => ("http://127.0.0.1:8899".to_string(), None),
        _ => {
            if input.starts_with("http://") || input.starts_with("https://") {
                let label = if lowered.contains("devnet") {
                    Some("devnet".to_string())
                } else if lowered.contains("testnet") {
                    Some("testnet".to_string())
                } else if lowered.contains("mainnet") {
                    Some("mainnet-beta".to_string())
                } else {
                    None
                };
                (input.to_string(), label)
            } else {
                return Err(anyhow!("Unknown cluster: {}", input));
            }
        }
    };
    Ok(ClusterInfo { url, label })
}

fn parse_commitment(value: Option<&str>) -> CommitmentConfig {
    match value.unwrap_or("confirmed") {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|_| anyhow!("Invalid pubkey: {}", value))
}

fn resolve_mint(mint: &Option<String>) -> Result<Pubkey> {
    let value = mint.as_deref().ok_or_else(|| anyhow!("Missing --mint"))?;
    parse_pubkey(value)
}

fn parse_amount(value: &str, decimals: u8) -> Result<u64> {
    let sanitized = value.replace('_', "");
    if let Some((whole, fractional)) = sanitized.split_once('.') {
        let whole_value: u64 = if whole.is_empty() { 0 } else { whole.parse()? };
        let mut fraction = fractional.to_string();
        if fraction.len() > decimals as usize {
            return Err(anyhow!("Too many decimal places"));
        }
        while fraction.len() < decimals as usize {
            fraction.push('0');
        }
        let fractional_value: u64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse()?
        };
        let scale = 10u64
            .checked_pow(decimals as u32)
            .ok_or_else(|| anyhow!("Decimal overflow"))?;
        whole_value
            .checked_mul(scale)
            .and_then(|value| value.checked_add(fractional_value))
            .ok_or_else(|| anyhow!("Amount overflow"))
    } else {
        let whole: u64 = sanitized.parse()?;
        let scale = 10u64
            .checked_pow(decimals as u32)
            .ok_or_else(|| anyhow!("Decimal overflow"))?;
        whole
            .checked_mul(scale)
            .ok_or_else(|| anyhow!("Amount overflow"))
    }
}

fn format_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let Some(scale) = 10u64.checked_pow(decimals as u32) else {
        return amount.to_string();
    };
    let whole = amount / scale;
    let frac = amount % scale;
    format!("{}.{:0width$}", whole, frac, width = decimals as usize)
}

fn explorer_url(signature: &str, cluster: &ClusterInfo) -> Option<String> {
    cluster.label.as_ref().map(|label| {
        format!(
            "https://explorer.solana.com/tx/{}?cluster={}",
            signature, label
        )
    })
}

fn print_signature(signature: &str, explorer: Option<String>) {
    println!("Tx: {}", signature);
    if let Some(url) = explorer {
        println!("Explorer: {}", url);
    }
}

fn send_transaction(
    ctx: AppContext<'_>,
    instructions: Vec<Instruction>,
    extra_signers: Vec<&Keypair>,
) -> Result<String> {
    let blockhash = ctx.client.get_latest_blockhash()?;
    let mut transaction = Transaction::new_with_payer(&instructions, Some(&ctx.payer.pubkey()));
    let mut signers: Vec<&dyn Signer> = vec![ctx.payer];
    for signer in extra_signers {
        if signer.pubkey() != ctx.payer.pubkey() {
            signers.push(signer);
        }
    }
    transaction.sign(&signers, blockhash);
    let signature = ctx.client.send_and_confirm_transaction(&transaction)?;
    Ok(signature.to_string())
}

fn fetch_registry(ctx: AppContext<'_>, registry_pda: &Pubkey) -> Result<Ztoken> {
    let account = ctx
        .client
        .get_account(registry_pda)
        .context("Registry not found; run `ztoken init` first")?;
    let mut data = account.data.as_slice();
    Ztoken::try_deserialize(&mut data).context("Failed to decode registry")
}

/// `None` only when the account does not exist; RPC failures are errors.
fn fetch_optional_account(
    ctx: AppContext<'_>,
    address: &Pubkey,
) -> Result<Option<solana_sdk::account::Account>> {
    let response = ctx
        .client
        .get_account_with_commitment(address, ctx.client.commitment())
        .with_context(|| format!("Failed to fetch account {}", address))?;
    Ok(response.value)
}

fn fetch_metadata(ctx: AppContext<'_>, metadata_pda: &Pubkey) -> Result<Option<TokenMetadata>> {
    let Some(account) = fetch_optional_account(ctx, metadata_pda)? else {
        return Ok(None);
    };
    let mut data = account.data.as_slice();
    let decoded =
        TokenMetadata::try_deserialize(&mut data).context("Failed to decode token metadata")?;
    Ok(Some(decoded))
}

fn fetch_frozen_account(ctx: AppContext<'_>, frozen_pda: &Pubkey) -> Result<Option<FrozenAccount>> {
    let Some(account) = fetch_optional_account(ctx, frozen_pda)? else {
        return Ok(None);
    };
    let mut data = account.data.as_slice();
    let decoded =
        FrozenAccount::try_deserialize(&mut data).context("Failed to decode freeze record")?;
    Ok(Some(decoded))
}

/// Freeze record of `owner` if one has ever been written.
fn existing_frozen_pda(ctx: AppContext<'_>, owner: &Pubkey) -> Result<Option<Pubkey>> {
    let pda = find_frozen_pda(owner, &ztoken::ID).0;
    Ok(fetch_optional_account(ctx, &pda)?.map(|_| pda))
}

fn find_metadata_by_mint(
    ctx: AppContext<'_>,
    mint: &Pubkey,
) -> Result<Option<(Pubkey, TokenMetadata)>> {
    let config = RpcProgramAccountsConfig {
        filters: Some(vec![
            RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                0,
                TokenMetadata::DISCRIMINATOR.as_ref(),
            )),
            RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                TokenMetadata::MINT_OFFSET,
                mint.as_ref(),
            )),
        ]),
        account_config: RpcAccountInfoConfig {
            encoding: None,
            commitment: Some(ctx.client.commitment()),
            data_slice: None,
            min_context_slot: None,
        },
        ..RpcProgramAccountsConfig::default()
    };

    let accounts = ctx
        .client
        .get_program_accounts_with_config(&ztoken::ID, config)?;

    for (key, account) in accounts {
        let mut data = account.data.as_slice();
        if let Ok(decoded) = TokenMetadata::try_deserialize(&mut data) {
            return Ok(Some((key, decoded)));
        }
    }
    Ok(None)
}

fn fetch_mint_decimals(ctx: AppContext<'_>, mint: &Pubkey) -> Result<u8> {
    let account = ctx.client.get_account(mint)?;
    let parsed = StateWithExtensions::<MintState>::unpack(&account.data)
        .map_err(|err| anyhow!("Failed to decode mint: {}", err))?;
    Ok(parsed.base.decimals)
}

fn anchor_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{}", name));
    let hash = hasher.finalize();
    let mut output = [0u8; 8];
    output.copy_from_slice(&hash[..8]);
    output
}

fn build_instruction(name: &str, data: Vec<u8>, accounts: Vec<AccountMeta>) -> Instruction {
    let mut payload = Vec::with_capacity(8 + data.len());
    payload.extend_from_slice(&anchor_discriminator(name));
    payload.extend_from_slice(&data);
    Instruction {
        program_id: ztoken::ID,
        accounts,
        data: payload,
    }
}

/// Anchor reads the program id in an optional slot as "not supplied".
fn optional_account(key: Option<Pubkey>) -> AccountMeta {
    AccountMeta::new_readonly(key.unwrap_or(ztoken::ID), false)
}

#[derive(BorshSerialize)]
struct CreateMintArgsData {
    name: String,
    symbol: String,
    decimals: u8,
    init_supply: u64,
}

#[derive(BorshSerialize)]
struct AmountArgs {
    amount: u64,
}

fn build_initialize_instruction(payer: Pubkey, registry_pda: Pubkey) -> Instruction {
    let accounts = vec![
        AccountMeta::new(payer, true),
        AccountMeta::new(registry_pda, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    build_instruction("initialize", Vec::new(), accounts)
}

struct CreateMintParams {
    payer: Pubkey,
    mint: Pubkey,
    token_account: Pubkey,
    metadata_pda: Pubkey,
    registry_pda: Pubkey,
    token_program: Pubkey,
    name: String,
    symbol: String,
    decimals: u8,
    init_supply: u64,
}

fn build_create_mint_instruction(params: CreateMintParams) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(params.payer, true),
        AccountMeta::new(params.mint, true),
        AccountMeta::new(params.token_account, true),
        AccountMeta::new(params.metadata_pda, false),
        AccountMeta::new(params.registry_pda, false),
        AccountMeta::new_readonly(params.token_program, false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let data = CreateMintArgsData {
        name: params.name,
        symbol: params.symbol,
        decimals: params.decimals,
        init_supply: params.init_supply,
    }
    .try_to_vec()?;
    Ok(build_instruction("create_mint", data, accounts))
}

fn build_create_or_get_ata_instruction(
    payer: Pubkey,
    user: Pubkey,
    mint: Pubkey,
    user_ata: Pubkey,
    token_program: Pubkey,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(payer, true),
        AccountMeta::new_readonly(user, false),
        AccountMeta::new_readonly(mint, false),
        AccountMeta::new(user_ata, false),
        AccountMeta::new_readonly(token_program, false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];
    build_instruction("create_or_get_ata", Vec::new(), accounts)
}

fn build_close_ata_instruction(user: Pubkey, user_ata: Pubkey, token_program: Pubkey) -> Instruction {
    let accounts = vec![
        AccountMeta::new(user, true),
        AccountMeta::new(user_ata, false),
        AccountMeta::new_readonly(token_program, false),
    ];
    build_instruction("close_ata", Vec::new(), accounts)
}

struct TransferParams {
    from_authority: Pubkey,
    from_ata: Pubkey,
    to_ata: Pubkey,
    mint: Pubkey,
    token_program: Pubkey,
    frozen_account: Option<Pubkey>,
    recipient_frozen_account: Option<Pubkey>,
    amount: u64,
}

fn build_transfer_instruction(params: TransferParams) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(params.from_authority, true),
        AccountMeta::new(params.from_ata, false),
        AccountMeta::new(params.to_ata, false),
        AccountMeta::new_readonly(params.mint, false),
        AccountMeta::new_readonly(params.token_program, false),
        optional_account(params.frozen_account),
        optional_account(params.recipient_frozen_account),
    ];
    let data = AmountArgs {
        amount: params.amount,
    }
    .try_to_vec()?;
    Ok(build_instruction("transfer", data, accounts))
}

struct MintToParams {
    authority: Pubkey,
    mint: Pubkey,
    to_ata: Pubkey,
    token_program: Pubkey,
    metadata_pda: Pubkey,
    amount: u64,
}

fn build_mint_to_instruction(params: MintToParams) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(params.authority, true),
        AccountMeta::new(params.mint, false),
        AccountMeta::new(params.to_ata, false),
        AccountMeta::new_readonly(params.token_program, false),
        AccountMeta::new_readonly(params.metadata_pda, false),
    ];
    let data = AmountArgs {
        amount: params.amount,
    }
    .try_to_vec()?;
    Ok(build_instruction("mint_to", data, accounts))
}

struct FreezeParams {
    authority: Pubkey,
    frozen_pda: Pubkey,
    target: Pubkey,
    freeze: bool,
}

fn build_freeze_instruction(params: FreezeParams) -> Instruction {
    let accounts = vec![
        AccountMeta::new(params.authority, true),
        AccountMeta::new(params.frozen_pda, false),
        AccountMeta::new_readonly(params.target, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    let name = if params.freeze {
        "freeze_account"
    } else {
        "unfreeze_account"
    };
    build_instruction(name, Vec::new(), accounts)
}

#[derive(Serialize)]
struct InitOutput {
    registry: String,
    signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct CreateMintOutput {
    id: u64,
    mint: String,
    token_account: String,
    metadata: String,
    signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct AtaOutput {
    owner: String,
    ata: String,
    signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct MintOutput {
    signature: String,
    explorer: Option<String>,
    new_supply: String,
}

#[derive(Serialize)]
struct SimpleOutput {
    signature: String,
    explorer: Option<String>,
}

#[derive(Serialize)]
struct FrozenOutput {
    account: String,
    is_frozen: bool,
    updated_by: Option<String>,
}

#[derive(Serialize)]
struct StatusOutput {
    registry: String,
    admin: String,
    token_count: u64,
}

#[derive(Serialize, Clone)]
struct TokenInfo {
    id: u64,
    address: String,
    name: String,
    symbol: String,
    decimals: u8,
    mint: String,
    authority: String,
}

impl TokenInfo {
    fn new(address: &Pubkey, metadata: &TokenMetadata) -> Self {
        Self {
            id: metadata.id,
            address: address.to_string(),
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            decimals: metadata.decimals,
            mint: metadata.mint.to_string(),
            authority: metadata.authority.to_string(),
        }
    }
}

#[derive(Serialize)]
struct TokensOutput {
    tokens: Vec<TokenInfo>,
}

#[derive(Serialize)]
struct BalanceOutput {
    owner: String,
    token_account: String,
    amount: u64,
}

fn print_token(info: &TokenInfo) {
    println!(
        "#{} {} ({}) decimals={} mint={} authority={}",
        info.id, info.name, info.symbol, info.decimals, info.mint, info.authority
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amounts_with_decimals() {
        assert_eq!(parse_amount("1", 6).unwrap(), 1_000_000);
        assert_eq!(parse_amount("1.5", 6).unwrap(), 1_500_000);
        assert_eq!(parse_amount("0.000001", 6).unwrap(), 1);
        assert_eq!(parse_amount("1_000.25", 2).unwrap(), 100_025);
        assert_eq!(parse_amount("1000", 0).unwrap(), 1000);
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(parse_amount("0.1234567", 6).is_err());
        assert!(parse_amount("abc", 6).is_err());
        assert!(parse_amount("18446744073709551615", 1).is_err());
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_amount(1_500_000, 6), "1.500000");
        assert_eq!(format_amount(100, 2), "1.00");
        assert_eq!(format_amount(10, 0), "10");
    }

    #[test]
    fn formats_amounts_with_oversized_decimals() {
        assert_eq!(format_amount(12345, 20), "12345");
        assert_eq!(format_amount(u64::MAX, u8::MAX), u64::MAX.to_string());
    }

    fn mint_args() -> CreateMintArgs {
        CreateMintArgs {
            config: None,
            name: None,
            symbol: None,
            decimals: None,
            supply: None,
        }
    }

    fn file_config() -> ZtokenConfig {
        ZtokenConfig {
            token: TokenConfig {
                name: "Test Mint".to_string(),
                symbol: "TST".to_string(),
                decimals: Some(2),
                initial_supply: Some("10".to_string()),
            },
            network: None,
        }
    }

    #[test]
    fn config_file_rejects_every_token_flag() {
        let config = file_config();
        let with_decimals = CreateMintArgs {
            decimals: Some(9),
            ..mint_args()
        };
        assert!(resolve_token_config(&with_decimals, Some(&config)).is_err());
        let with_supply = CreateMintArgs {
            supply: Some("5".to_string()),
            ..mint_args()
        };
        assert!(resolve_token_config(&with_supply, Some(&config)).is_err());
        let with_name = CreateMintArgs {
            name: Some("Other".to_string()),
            ..mint_args()
        };
        assert!(resolve_token_config(&with_name, Some(&config)).is_err());

        let token = resolve_token_config(&mint_args(), Some(&config)).unwrap();
        assert_eq!(token.decimals, Some(2));
        assert_eq!(token.initial_supply.as_deref(), Some("10"));
    }

    #[test]
    fn token_flags_without_config() {
        let args = CreateMintArgs {
            name: Some("Test Mint".to_string()),
            symbol: Some("TST".to_string()),
            ..mint_args()
        };
        let token = resolve_token_config(&args, None).unwrap();
        assert_eq!(token.name, "Test Mint");
        assert!(token.decimals.is_none());
        assert!(resolve_token_config(&mint_args(), None).is_err());
    }

    #[test]
    fn rpc_failure_is_not_a_missing_account() {
        let client = RpcClient::new_mock("fails".to_string());
        let payer = Keypair::new();
        let cluster = resolve_cluster("localnet").unwrap();
        let ctx = AppContext {
            client: &client,
            payer: &payer,
            output: OutputFormat::Text,
            token_program: spl_token::id(),
            cluster: &cluster,
        };
        let owner = Pubkey::new_unique();
        assert!(fetch_optional_account(ctx, &owner).is_err());
        assert!(existing_frozen_pda(ctx, &owner).is_err());
        assert!(fetch_frozen_account(ctx, &find_frozen_pda(&owner, &ztoken::ID).0).is_err());
        assert!(fetch_metadata(ctx, &find_metadata_pda(0, &ztoken::ID).0).is_err());
    }

    #[test]
    fn parses_token_config() {
        let config = parse_ztoken_config(
            r#"
            [token]
            name = "Test Mint"
            symbol = "TST"
            decimals = 6
            initial_supply = "1000"

            [network]
            cluster = "localnet"
            "#,
        )
        .unwrap();
        assert_eq!(config.token.name, "Test Mint");
        assert_eq!(config.token.symbol, "TST");
        assert_eq!(config.token.decimals, Some(6));
        assert_eq!(config.token.initial_supply.as_deref(), Some("1000"));
        let network = config.network.unwrap();
        assert_eq!(network.cluster.as_deref(), Some("localnet"));
        assert!(network.keypair_path.is_none());
    }

    #[test]
    fn token_config_requires_name() {
        assert!(parse_ztoken_config("[token]\nsymbol = \"TST\"\n").is_err());
    }

    #[test]
    fn resolves_clusters() {
        let devnet = resolve_cluster("devnet").unwrap();
        assert_eq!(devnet.url, "https://api.devnet.solana.com");
        assert_eq!(devnet.label.as_deref(), Some("devnet"));
        let local = resolve_cluster("localnet").unwrap();
        assert!(local.label.is_none());
        assert!(resolve_cluster("nowhere").is_err());
    }

    #[test]
    fn instruction_discriminators_match_anchor() {
        assert_eq!(
            anchor_discriminator("initialize"),
            [175, 175, 109, 31, 13, 152, 155, 237]
        );
        assert_eq!(
            anchor_discriminator("transfer"),
            [163, 52, 200, 231, 140, 3, 69, 186]
        );
        assert_eq!(
            anchor_discriminator("create_mint"),
            [69, 44, 215, 132, 253, 214, 41, 45]
        );
    }

    #[test]
    fn transfer_without_freeze_records_uses_program_id() {
        let ix = build_transfer_instruction(TransferParams {
            from_authority: Pubkey::new_unique(),
            from_ata: Pubkey::new_unique(),
            to_ata: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            token_program: spl_token::id(),
            frozen_account: None,
            recipient_frozen_account: None,
            amount: 100,
        })
        .unwrap();
        assert_eq!(ix.accounts.len(), 7);
        assert_eq!(ix.accounts[5].pubkey, ztoken::ID);
        assert_eq!(ix.accounts[6].pubkey, ztoken::ID);
        assert_eq!(&ix.data[..8], &anchor_discriminator("transfer"));
        assert_eq!(&ix.data[8..], &100u64.to_le_bytes());
    }

    #[test]
    fn transfer_passes_sender_freeze_record() {
        let sender = Pubkey::new_unique();
        let record = find_frozen_pda(&sender, &ztoken::ID).0;
        let ix = build_transfer_instruction(TransferParams {
            from_authority: sender,
            from_ata: Pubkey::new_unique(),
            to_ata: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            token_program: spl_token::id(),
            frozen_account: Some(record),
            recipient_frozen_account: None,
            amount: 10,
        })
        .unwrap();
        assert_eq!(ix.accounts[5].pubkey, record);
        assert!(ix.accounts[0].is_signer);
    }

    #[test]
    fn freeze_and_unfreeze_share_record() {
        let target = Pubkey::new_unique();
        let frozen_pda = find_frozen_pda(&target, &ztoken::ID).0;
        let authority = Pubkey::new_unique();
        let freeze = build_freeze_instruction(FreezeParams {
            authority,
            frozen_pda,
            target,
            freeze: true,
        });
        let unfreeze = build_freeze_instruction(FreezeParams {
            authority,
            frozen_pda,
            target,
            freeze: false,
        });
        assert_eq!(freeze.accounts[1].pubkey, unfreeze.accounts[1].pubkey);
        assert_ne!(freeze.data, unfreeze.data);
    }

    #[test]
    fn create_mint_encodes_args_after_discriminator() {
        let ix = build_create_mint_instruction(CreateMintParams {
            payer: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            token_account: Pubkey::new_unique(),
            metadata_pda: find_metadata_pda(0, &ztoken::ID).0,
            registry_pda: find_registry_pda(&ztoken::ID).0,
            token_program: spl_token::id(),
            name: "Test Mint".to_string(),
            symbol: "TST".to_string(),
            decimals: 6,
            init_supply: 1000,
        })
        .unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&9u32.to_le_bytes());
        expected.extend_from_slice(b"Test Mint");
        expected.extend_from_slice(&3u32.to_le_bytes());
        expected.extend_from_slice(b"TST");
        expected.push(6);
        expected.extend_from_slice(&1000u64.to_le_bytes());
        assert_eq!(&ix.data[8..], expected.as_slice());
        assert!(ix.accounts[1].is_signer && ix.accounts[2].is_signer);
    }
}
