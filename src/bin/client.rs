use clap::{Parser, Subcommand};
use schnorr_zkp_auth::proto::auth_service_client::AuthServiceClient;
use schnorr_zkp_auth::proto::{
    ChallengeRequest, ParametersRequest, RegistrationRequest, VerificationRequest,
};
use schnorr_zkp_auth::verifier::service::SESSION_HEADER;
use schnorr_zkp_auth::{wire, DomainParameters, KeyPair, Prover, SecureRng};
use tonic::transport::Channel;
use tonic::Request;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Schnorr zero-knowledge authentication client", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:50051")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the server's domain parameters
    Params,

    /// Derive a key from the password and register its public half
    Register {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        password: String,
    },

    /// Prove knowledge of the password without sending it
    Login {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        password: String,
    },
}

async fn fetch_parameters(
    client: &mut AuthServiceClient<Channel>,
) -> Result<DomainParameters, Box<dyn std::error::Error>> {
    let response = client
        .get_parameters(Request::new(ParametersRequest {}))
        .await?
        .into_inner();

    let modulus = wire::decode("modulus", &response.modulus)?;
    let generator = wire::decode("generator", &response.generator)?;
    Ok(DomainParameters::new(modulus, generator)?)
}

async fn register(
    client: &mut AuthServiceClient<Channel>,
    user: String,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = fetch_parameters(client).await?;
    let keys = KeyPair::derive(password.as_bytes(), &params)?;

    let response = client
        .register(Request::new(RegistrationRequest {
            identity: user,
            public_key: wire::encode(keys.public_key()),
        }))
        .await?
        .into_inner();

    println!("{}", response.message);
    Ok(())
}

async fn login(
    client: &mut AuthServiceClient<Channel>,
    user: String,
    password: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let params = fetch_parameters(client).await?;
    let keys = KeyPair::derive(password.as_bytes(), &params)?;
    let prover = Prover::new(params);

    let (commitment, nonce) = prover.commit(&SecureRng::new())?;
    println!("Commitment t = {commitment}");

    let challenge_response = client
        .create_challenge(Request::new(ChallengeRequest {
            identity: user,
            commitment: wire::encode(&commitment),
        }))
        .await?;

    let session = challenge_response
        .metadata()
        .get(SESSION_HEADER)
        .cloned()
        .ok_or("server did not return a session key")?;

    let challenge = wire::decode("challenge", &challenge_response.into_inner().challenge)?;
    println!("Challenge c = {challenge}");

    let response = prover.respond(&challenge, nonce, keys.private_exponent())?;
    println!("Response  s = {response}");

    let mut request = Request::new(VerificationRequest {
        response: wire::encode(&response),
    });
    request.metadata_mut().insert(SESSION_HEADER, session);

    let result = client.verify_proof(request).await?.into_inner();

    println!("g^s mod p       = {}", result.lhs);
    println!("t * y^c mod p   = {}", result.rhs);

    Ok(result.accepted)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = AuthServiceClient::connect(cli.server).await?;

    match cli.command {
        Commands::Params => {
            let params = fetch_parameters(&mut client).await?;
            println!("modulus   = {}", params.modulus());
            println!("generator = {}", params.generator());
        }
        Commands::Register { user, password } => {
            let password = Zeroizing::new(password);
            register(&mut client, user, &password).await?;
        }
        Commands::Login { user, password } => {
            let password = Zeroizing::new(password);
            let accepted = login(&mut client, user, &password).await?;
            drop(password);

            if accepted {
                println!("Authenticated");
            } else {
                println!("Zero-knowledge proof rejected");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
