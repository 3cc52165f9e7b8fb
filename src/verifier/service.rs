use tonic::metadata::{Ascii, MetadataValue};
use tonic::{Request, Response, Status};
use tracing::{debug, info, warn};

use super::state::ServerState;
use super::SessionKey;
use crate::proto::auth_service_server::AuthService;
use crate::proto::{
    ChallengeRequest, ChallengeResponse, LogoutRequest, LogoutResponse, ParametersRequest,
    ParametersResponse, RegistrationRequest, RegistrationResponse, VerificationRequest,
    VerificationResponse,
};
use crate::{wire, Error};

/// Metadata header carrying the session key.
pub const SESSION_HEADER: &str = "x-session-id";

const MAX_IDENTITY_LEN: usize = 256;
const MAX_SESSION_KEY_LEN: usize = 128;

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::IdentityNotFound(_) => Status::not_found(err.to_string()),
            Error::IdentityExists(_) => Status::already_exists(err.to_string()),
            Error::InvalidCommitment(_)
            | Error::InvalidChallenge(_)
            | Error::InvalidPublicKey(_)
            | Error::InvalidEncoding(_) => Status::invalid_argument(err.to_string()),
            Error::SessionExpired => Status::failed_precondition(err.to_string()),
            Error::CapacityExceeded(_) => Status::resource_exhausted(err.to_string()),
            Error::InvalidParameters(_) | Error::Randomness(_) => {
                Status::internal(err.to_string())
            }
        }
    }
}

/// gRPC service implementation for Schnorr authentication.
pub struct AuthServiceImpl {
    state: ServerState,
}

impl AuthServiceImpl {
    /// Creates a new authentication service with the given state.
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    #[allow(clippy::result_large_err)]
    fn validate_identity(identity: &str) -> Result<(), Status> {
        if identity.is_empty() {
            return Err(Status::invalid_argument("Identity cannot be empty"));
        }

        if identity.len() > MAX_IDENTITY_LEN {
            return Err(Status::invalid_argument("Identity too long"));
        }

        if !identity
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(Status::invalid_argument(
                "Identity contains invalid characters",
            ));
        }

        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn parse_session_key(value: &MetadataValue<Ascii>) -> Result<SessionKey, Status> {
        let key = value
            .to_str()
            .map_err(|_| Status::invalid_argument("Session key is not valid ASCII"))?;

        if key.is_empty() || key.len() > MAX_SESSION_KEY_LEN {
            return Err(Status::invalid_argument("Session key has invalid length"));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Status::invalid_argument(
                "Session key contains invalid characters",
            ));
        }

        Ok(SessionKey::new(key))
    }

    #[allow(clippy::result_large_err)]
    fn session_key<T>(request: &Request<T>) -> Result<Option<SessionKey>, Status> {
        request
            .metadata()
            .get(SESSION_HEADER)
            .map(Self::parse_session_key)
            .transpose()
    }

    #[allow(clippy::result_large_err)]
    fn require_session_key<T>(request: &Request<T>) -> Result<SessionKey, Status> {
        Self::session_key(request)?.ok_or_else(|| {
            Status::failed_precondition(format!("Missing '{SESSION_HEADER}' metadata"))
        })
    }
}

#[tonic::async_trait]
impl AuthService for AuthServiceImpl {
    async fn get_parameters(
        &self,
        _request: Request<ParametersRequest>,
    ) -> Result<Response<ParametersResponse>, Status> {
        let params = self.state.params();

        Ok(Response::new(ParametersResponse {
            modulus: wire::encode(params.modulus()),
            generator: wire::encode(params.generator()),
        }))
    }

    async fn register(
        &self,
        request: Request<RegistrationRequest>,
    ) -> Result<Response<RegistrationResponse>, Status> {
        let req = request.into_inner();

        Self::validate_identity(&req.identity)?;
        let public_key = wire::decode("public_key", &req.public_key)?;

        self.state
            .register(&req.identity, public_key)
            .map_err(|e| {
                warn!(identity = %req.identity, error = %e, "Registration rejected");
                Status::from(e)
            })?;

        info!(identity = %req.identity, "Registered identity");

        Ok(Response::new(RegistrationResponse {
            success: true,
            message: format!("Identity '{}' registered successfully", req.identity),
        }))
    }

    async fn create_challenge(
        &self,
        request: Request<ChallengeRequest>,
    ) -> Result<Response<ChallengeResponse>, Status> {
        let (session, minted) = match Self::session_key(&request)? {
            Some(session) => (session, false),
            None => (SessionKey::generate(), true),
        };
        let req = request.into_inner();

        Self::validate_identity(&req.identity)?;
        let commitment = wire::decode("commitment", &req.commitment)?;

        let challenge = self
            .state
            .issue(&session, &req.identity, &commitment)
            .map_err(|e| {
                warn!(identity = %req.identity, error = %e, "Claim rejected");
                Status::from(e)
            })?;

        info!(identity = %req.identity, "Issued challenge");

        let mut response = Response::new(ChallengeResponse {
            challenge: wire::encode(&challenge),
        });

        if minted {
            debug!("Minted new session key");
            let value: MetadataValue<Ascii> = session
                .as_str()
                .parse()
                .map_err(|_| Status::internal("Session key is not valid metadata"))?;
            response.metadata_mut().insert(SESSION_HEADER, value);
        }

        Ok(response)
    }

    async fn verify_proof(
        &self,
        request: Request<VerificationRequest>,
    ) -> Result<Response<VerificationResponse>, Status> {
        let session = Self::require_session_key(&request)?;
        let req = request.into_inner();

        let response = wire::decode("response", &req.response)?;

        let result = self.state.verify(&session, &response).await.map_err(|e| {
            warn!(error = %e, "Verification could not run");
            Status::from(e)
        })?;

        info!(
            identity = %result.subject_identity,
            accepted = result.accepted,
            lhs = %result.lhs,
            rhs = %result.rhs,
            "Verified proof"
        );

        Ok(Response::new(VerificationResponse {
            accepted: result.accepted,
            lhs: wire::encode(&result.lhs),
            rhs: wire::encode(&result.rhs),
        }))
    }

    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let session = Self::require_session_key(&request)?;
        let success = self.state.logout(&session).await;

        debug!(success, "Logout");

        Ok(Response::new(LogoutResponse { success }))
    }
}
