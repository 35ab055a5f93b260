mod rpc;
mod store;

use std::path::PathBuf;

use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use two_owner_account::{
    recover_signer, AccountConfig, DualSignature, PairingContext, SerializedState,
    SignatureProof, TwoOwnerAccount,
};
use two_owner_account_types::{entry_point::ENTRY_POINT_V06, TransactionDetails};

use crate::{
    rpc::{RpcBase, RpcChain},
    store::{read_json, write_json_atomic, OperationFile},
};

/// Build and co-sign operations for a two-owner ERC-4337 account.
///
/// Owner one is the local key kept in the state file. Owner two signs the printed operation
/// hash out of band and hands the signature back to `assemble`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON-RPC endpoint of the chain the account lives on.
    #[arg(long, env = "RPC_URL", global = true, default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Account factory; the built-in default factory is used when unset.
    #[arg(long, env = "FACTORY_ADDRESS", global = true)]
    factory_address: Option<String>,

    /// EntryPoint contract the operations target.
    #[arg(long, env = "ENTRY_POINT", global = true, default_value_t = ENTRY_POINT_V06)]
    entry_point: Address,

    /// Path of the serialized account state (`{privateKey, ownerTwo}`).
    #[arg(long, env = "STATE_PATH", global = true, default_value = "two-owner-account.json")]
    state_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a fresh owner-one key paired with `--owner-two` and save the state.
    Init {
        #[arg(long)]
        owner_two: String,

        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },

    /// Print owners, factory, and initCode without touching the chain.
    Show,

    /// Print the counterfactual account address and whether it is deployed.
    Address,

    /// Print the nonce the next operation will use.
    Nonce,

    /// Build an unsigned operation calling `target` and write it with its hash.
    Build {
        #[arg(long)]
        target: Address,

        /// Wei to send, decimal or 0x-hex.
        #[arg(long, default_value = "0")]
        value: U256,

        /// Calldata for `target`.
        #[arg(long, default_value = "0x")]
        data: Bytes,

        #[arg(long)]
        nonce: Option<U256>,

        #[arg(long)]
        gas_limit: Option<U256>,

        #[arg(long)]
        max_fee_per_gas: Option<U256>,

        #[arg(long)]
        max_priority_fee_per_gas: Option<U256>,

        #[arg(long, default_value = "user-op.json")]
        out: PathBuf,
    },

    /// Recompute and print the hash both owners sign for an operation file.
    Hash {
        #[arg(long, default_value = "user-op.json")]
        op: PathBuf,
    },

    /// Attach owner two's signature and owner one's signature to an operation file.
    Assemble {
        #[arg(long, default_value = "user-op.json")]
        op: PathBuf,

        /// Owner two's 65-byte signature over the operation hash.
        #[arg(long)]
        signed_message: Bytes,

        /// Hash owner two signed; defaults to the hash recorded by `build`.
        #[arg(long)]
        signed_hash: Option<B256>,

        /// Sign without comparing against any recorded hash.
        #[arg(long, conflicts_with = "signed_hash")]
        skip_hash_check: bool,

        #[arg(long, default_value = "user-op.signed.json")]
        out: PathBuf,
    },

    /// Recover both signers of an assembled operation and check them against the owners.
    Verify {
        #[arg(long, default_value = "user-op.signed.json")]
        op: PathBuf,
    },

    /// Sign an arbitrary UTF-8 message with owner one's key.
    SignMessage { message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Init { owner_two, force } => {
            if cli.state_path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to replace it",
                    cli.state_path.display()
                );
            }
            let context = PairingContext::new(owner_two.as_str());
            let account = TwoOwnerAccount::create(base(&cli)?, config(&cli), &context);
            account
                .owner_two_address()
                .context("--owner-two is not a valid address")?;
            write_json_atomic(&cli.state_path, &account.serialize())?;
            info!(path = %cli.state_path.display(), "saved account state");
            println!("owner one: {}", account.owner_one_address());
        }
        Command::Show => {
            let account = load_account(&cli)?;
            println!("owner one: {}", account.owner_one_address());
            println!("owner two: {}", account.owner_two_address()?);
            println!("factory:   {}", account.factory_address()?);
            println!("index:     {}", account.index());
            println!("initCode:  {}", account.get_account_init_code()?);
        }
        Command::Address => {
            let account = load_account(&cli)?;
            let address = account.counterfactual_address().await?;
            let deployed = !account.is_phantom().await?;
            println!("address:  {address}");
            println!("deployed: {deployed}");
        }
        Command::Nonce => {
            let account = load_account(&cli)?;
            println!("{}", account.get_nonce().await?);
        }
        Command::Build {
            target,
            value,
            data,
            nonce,
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            out,
        } => {
            let account = load_account(&cli)?;
            let op = account
                .create_unsigned_user_op(TransactionDetails {
                    target: *target,
                    value: *value,
                    data: data.clone(),
                    nonce: *nonce,
                    gas_limit: *gas_limit,
                    max_fee_per_gas: *max_fee_per_gas,
                    max_priority_fee_per_gas: *max_priority_fee_per_gas,
                })
                .await?;
            let hash = account.get_user_op_hash_to_sign(&op).await?;
            write_json_atomic(out, &OperationFile::new(op, hash))?;
            info!(path = %out.display(), "wrote unsigned operation");
            println!("{hash}");
        }
        Command::Hash { op } => {
            let account = load_account(&cli)?;
            let file: OperationFile = read_json(op)?;
            let hash = account.get_user_op_hash_to_sign(&file.user_op).await?;
            if file.user_op_hash.is_some_and(|recorded| recorded != hash) {
                warn!(path = %op.display(), "recorded hash is stale");
            }
            println!("{hash}");
        }
        Command::Assemble {
            op,
            signed_message,
            signed_hash,
            skip_hash_check,
            out,
        } => {
            let account = load_account(&cli)?;
            let file: OperationFile = read_json(op)?;
            let proof = match signed_hash.or(file.user_op_hash) {
                Some(hash) if !*skip_hash_check => {
                    SignatureProof::for_hash(signed_message.clone(), hash)
                }
                _ => SignatureProof::new(signed_message.clone()),
            };
            let signed = account
                .sign_user_op_with_context(&file.user_op, &proof)
                .await?;
            let hash = account.get_user_op_hash_to_sign(&signed).await?;
            write_json_atomic(out, &OperationFile::new(signed, hash))?;
            info!(path = %out.display(), "wrote signed operation");
        }
        Command::Verify { op } => {
            let account = load_account(&cli)?;
            let file: OperationFile = read_json(op)?;
            let hash = account.get_user_op_hash_to_sign(&file.user_op).await?;
            verify_signers(
                &file.user_op.signature,
                hash,
                account.owner_one_address(),
                account.owner_two_address()?,
            )?;
            println!("ok: both owners signed {hash}");
        }
        Command::SignMessage { message } => {
            let account = load_account(&cli)?;
            println!("{}", account.sign_message(message.as_bytes())?);
        }
    }
    Ok(())
}

fn config(cli: &Cli) -> AccountConfig {
    AccountConfig::new(cli.factory_address.clone())
}

fn base(cli: &Cli) -> Result<RpcBase> {
    let chain = RpcChain::new(&cli.rpc_url)?;
    Ok(RpcBase::new(chain, cli.entry_point))
}

fn load_account(cli: &Cli) -> Result<TwoOwnerAccount<RpcBase>> {
    let state: SerializedState = read_json(&cli.state_path)
        .context("run `two-owner init` first to create the account state")?;
    TwoOwnerAccount::from_state(base(cli)?, config(cli), &state)
        .with_context(|| format!("failed restoring account from {}", cli.state_path.display()))
}

/// Checks that both halves of `signature` recover to the expected owners over `hash`.
fn verify_signers(
    signature: &[u8],
    hash: B256,
    owner_one: Address,
    owner_two: Address,
) -> Result<()> {
    let dual = DualSignature::abi_decode(signature).context("signature is not a two-owner pair")?;
    let first = recover_signer(hash.as_slice(), &dual.owner_one)?;
    let second = recover_signer(hash.as_slice(), &dual.owner_two)?;
    if first != owner_one {
        bail!("owner one signature recovers to {first}, expected {owner_one}");
    }
    if second != owner_two {
        bail!("owner two signature recovers to {second}, expected {owner_two}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;
    use two_owner_account::OwnerKey;

    const OWNER_ONE_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const OWNER_TWO_KEY: &str = "0x8da4ef21b864d2cc526dbdb2a120bd2874c36c9d0a1fb7f8c63d7f7a8b41de8f";
    const HASH: B256 = b256!("bc462f22d3ac61432d3cfed7f748d797aca8a79fb6a92735b50b3d6c7c0cedba");

    fn pair(one: &OwnerKey, two: &OwnerKey, hash: B256) -> Bytes {
        DualSignature::new(
            one.sign_message(hash.as_slice()).unwrap(),
            two.sign_message(hash.as_slice()).unwrap(),
        )
        .abi_encode()
    }

    #[test]
    fn test_verify_signers_accepts_both_owners() {
        let one = OwnerKey::from_hex(OWNER_ONE_KEY).unwrap();
        let two = OwnerKey::from_hex(OWNER_TWO_KEY).unwrap();
        let signature = pair(&one, &two, HASH);
        verify_signers(&signature, HASH, one.address(), two.address()).unwrap();
    }

    #[test]
    fn test_verify_signers_rejects_swapped_owners() {
        let one = OwnerKey::from_hex(OWNER_ONE_KEY).unwrap();
        let two = OwnerKey::from_hex(OWNER_TWO_KEY).unwrap();
        let signature = pair(&two, &one, HASH);
        let err = verify_signers(&signature, HASH, one.address(), two.address()).unwrap_err();
        assert!(err.to_string().contains("owner one"));
    }

    #[test]
    fn test_verify_signers_rejects_other_hash() {
        let one = OwnerKey::from_hex(OWNER_ONE_KEY).unwrap();
        let two = OwnerKey::from_hex(OWNER_TWO_KEY).unwrap();
        let signature = pair(&one, &two, B256::repeat_byte(0x11));
        assert!(verify_signers(&signature, HASH, one.address(), two.address()).is_err());
    }

    #[test]
    fn test_verify_signers_rejects_unpaired_signature() {
        let one = OwnerKey::from_hex(OWNER_ONE_KEY).unwrap();
        let raw = one.sign_message(HASH.as_slice()).unwrap();
        assert!(verify_signers(&raw, HASH, one.address(), Address::ZERO).is_err());
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "two-owner",
            "--factory-address",
            "0x9406Cc6185a346906296840746125a0E44976454",
            "build",
            "--target",
            "0x63FaC9201494f0bd17B9892B9fae4d52fe3BD377",
            "--value",
            "1000",
            "--data",
            "0xdeadbeef",
        ])
        .unwrap();
        assert_eq!(cli.entry_point, ENTRY_POINT_V06);
        match cli.command {
            Command::Build {
                value, data, nonce, out, ..
            } => {
                assert_eq!(value, U256::from(1000));
                assert_eq!(data, Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]));
                assert_eq!(nonce, None);
                assert_eq!(out, PathBuf::from("user-op.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_hash_flags() {
        let result = Cli::try_parse_from([
            "two-owner",
            "assemble",
            "--signed-message",
            "0x00",
            "--signed-hash",
            "0xbc462f22d3ac61432d3cfed7f748d797aca8a79fb6a92735b50b3d6c7c0cedba",
            "--skip-hash-check",
        ]);
        assert!(result.is_err());
    }
}
