/*
Command-line front-end for the ethkit codec and signer.

Usage:
  ethkit selector "transfer(address,uint256)"
  ethkit encode-call --abi erc20.json --function transfer --args '["0x...", "1000"]'
  ethkit decode-rlp 0xc88363617483646f67
  ethkit sign-tx --key 0x... --tx '{"nonce":0,"gasPrice":"1000000000","gas":21000,"chainId":1}'
  ethkit recover-tx 0xf86c...
  ethkit checksum 0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed
*/

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use ethkit::abi::json::values_from_json;
use ethkit::abi::{AbiError, Contract, Function};
use ethkit::crypto::{parse_address, selector, to_checksum};
use ethkit::rlp::{self, RlpItem};
use ethkit::signing::PrivateKey;
use ethkit::transaction::{SignedTransaction, TransactionRequest};
use ethkit::{Address, Config};
use ethkit_common::{decode_hex, encode_hex};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "ethkit", version, about = "Ethereum ABI/RLP codec and transaction signer")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// Function signature, e.g. "transfer(address,uint256)"
        signature: String,
    },
    /// Encode call data for a contract function
    EncodeCall {
        /// Path to the contract ABI JSON
        #[arg(long, value_name = "FILE")]
        abi: PathBuf,

        /// Function name, full signature or 0x selector
        #[arg(short, long)]
        function: String,

        /// Arguments as a JSON array
        #[arg(long, default_value = "[]")]
        args: String,
    },
    /// Decode RLP bytes into a JSON tree
    DecodeRlp {
        /// Hex-encoded RLP
        data: String,
    },
    /// Sign a transaction and print the raw wire hex
    SignTx {
        /// Hex-encoded private key
        #[arg(long, env = "ETHKIT_PRIVATE_KEY", hide_env_values = true)]
        key: String,

        /// Transaction request as JSON
        #[arg(long)]
        tx: String,
    },
    /// Decode a raw signed transaction and recover its sender
    RecoverTx {
        /// Hex-encoded raw transaction
        raw: String,
    },
    /// Print an address with its EIP-55 checksum
    Checksum {
        /// Address to format
        address: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Selector { signature } => {
            println!("{}", encode_hex(&selector(&signature)));
        }
        Commands::EncodeCall {
            abi,
            function,
            args,
        } => {
            let json = std::fs::read_to_string(&abi)
                .with_context(|| format!("failed to read {}", abi.display()))?;
            let contract = Contract::from_json(&json).context("invalid ABI")?;
            let args: Vec<Value> =
                serde_json::from_str(&args).context("--args must be a JSON array")?;
            let function = resolve_function(&contract, &function, args.len())?;
            let values = values_from_json(&args, &function.input_types())
                .with_context(|| format!("arguments do not match {}", function.signature()))?;
            println!("{}", encode_hex(&function.encode_input(&values)?));
        }
        Commands::DecodeRlp { data } => {
            let bytes = decode_hex(&data).context("invalid hex")?;
            let item = rlp::decode_with_limits(&bytes, &config.limits)?;
            println!("{}", serde_json::to_string_pretty(&rlp_to_json(&item))?);
        }
        Commands::SignTx { key, tx } => {
            let signed = sign_request(&key, &tx, &config)?;
            println!("{}", signed.to_raw_hex());
        }
        Commands::RecoverTx { raw } => {
            let (signed, sender) = recover_raw(&raw)?;
            let output = json!({
                "from": to_checksum(&sender),
                "hash": encode_hex(&signed.hash()),
                "v": signed.v(),
                "transaction": TransactionRequest::from(signed.transaction()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Checksum { address } => {
            let address = parse_address(&address)?;
            println!("{}", to_checksum(&address));
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let config = config.apply_env()?;
    config.validate()?;
    Ok(config)
}

fn sign_request(key: &str, request: &str, config: &Config) -> ethkit::Result<SignedTransaction> {
    let key = PrivateKey::from_hex(key)?;
    let tx = TransactionRequest::from_json(request)?.into_transaction()?;
    log::info!("signing {} transaction, nonce {}", tx.tx_type(), tx.nonce());
    Ok(tx.sign(&key, &config.signer)?)
}

fn recover_raw(raw: &str) -> ethkit::Result<(SignedTransaction, Address)> {
    let signed = SignedTransaction::decode_hex(raw)?;
    let sender = signed.recover_sender()?;
    Ok((signed, sender))
}

/// Resolves `key`, falling back to arity when a bare name is overloaded.
fn resolve_function<'a>(contract: &'a Contract, key: &str, arity: usize) -> Result<&'a Function> {
    match contract.function(key) {
        Ok(function) => Ok(function),
        Err(AbiError::AmbiguousFunction { name, candidates }) => {
            let matching: Vec<&Function> = contract
                .overloads(&name)
                .into_iter()
                .filter(|f| f.inputs.len() == arity)
                .collect();
            match matching.as_slice() {
                [single] => Ok(*single),
                _ => bail!(
                    "{name} is overloaded; use one of: {}",
                    candidates.join(", ")
                ),
            }
        }
        Err(e) => Err(anyhow!(e)),
    }
}

fn rlp_to_json(item: &RlpItem) -> Value {
    match item {
        RlpItem::List(items) => Value::Array(items.iter().map(rlp_to_json).collect()),
        other => Value::String(encode_hex(other.as_bytes().unwrap_or_default())),
    }
}
