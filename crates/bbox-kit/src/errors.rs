use error_stack::{AttachmentKind, Context, FrameKind, Report};
use std::fmt;

/// Error kinds surfaced by the bbox client.
///
/// The kind is enough for a UI to pick a rendering; the actionable text (which wallet to
/// install, which contract to deploy) travels as an [`ErrorDocumentation`] attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BboxError {
    /// The host cannot reach the network or host wallet providers
    EnvironmentUnsupported,
    /// None of the supported wallet providers could be detected
    NoWalletDetected,
    /// The listing contract did not answer the deployment presence check
    ContractNotDeployed,
    /// The wallet signing flow could not be opened
    WalletInvocationFailed,
    /// A rating outside of the accepted range
    InvalidRating,
    /// A contract response could not be decoded
    MalformedContractResponse,
    /// A contract response was neither hex encoded nor a tagged value
    UnexpectedResponseShape,
    /// Transport level failure while talking to the read-only API
    Rpc,
    /// Persisted configuration could not be read or written
    Config,
}

impl fmt::Display for BboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BboxError::EnvironmentUnsupported => write!(f, "Unsupported execution environment"),
            BboxError::NoWalletDetected => write!(f, "No wallet detected"),
            BboxError::ContractNotDeployed => write!(f, "Contract not deployed"),
            BboxError::WalletInvocationFailed => write!(f, "Failed to open wallet for signing"),
            BboxError::InvalidRating => write!(f, "Invalid rating"),
            BboxError::MalformedContractResponse => write!(f, "Malformed contract response"),
            BboxError::UnexpectedResponseShape => write!(f, "Unexpected contract response format"),
            BboxError::Rpc => write!(f, "Read-only API request failed"),
            BboxError::Config => write!(f, "Configuration error"),
        }
    }
}

impl Context for BboxError {}

pub type BboxResult<T> = Result<T, Report<BboxError>>;

/// Remediation hint attached to user facing errors
#[derive(Debug, Clone)]
pub struct ErrorDocumentation {
    pub help: String,
    pub link: Option<String>,
}

impl fmt::Display for ErrorDocumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Help: {}", self.help)?;
        if let Some(link) = &self.link {
            write!(f, "\nSee: {}", link)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ContractInfo {
    pub contract_id: String,
    pub function: Option<String>,
}

impl fmt::Display for ContractInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contract: {}", self.contract_id)?;
        if let Some(function) = &self.function {
            write!(f, " function: {}", function)?;
        }
        Ok(())
    }
}

/// HTTP status returned by the read-only API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpStatus(pub u16);

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct RpcContext {
    pub endpoint: String,
    pub method: String,
}

impl fmt::Display for RpcContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.endpoint)
    }
}

/// Extension trait for adding common attachments
pub trait ErrorAttachments<T> {
    fn with_documentation(self, help: impl Into<String>) -> Self;
    fn with_link(self, link: impl Into<String>) -> Self;
    fn with_contract_info(self, contract_id: impl Into<String>, function: Option<&str>) -> Self;
}

impl<T, C> ErrorAttachments<T> for Result<T, Report<C>>
where
    C: Context,
{
    fn with_documentation(self, help: impl Into<String>) -> Self {
        self.map_err(|err| {
            let link = err.downcast_ref::<ErrorDocumentation>().and_then(|d| d.link.clone());
            err.attach(ErrorDocumentation { help: help.into(), link })
        })
    }

    fn with_link(self, link: impl Into<String>) -> Self {
        self.map_err(|err| {
            let help = err
                .downcast_ref::<ErrorDocumentation>()
                .map(|d| d.help.clone())
                .unwrap_or_default();
            err.attach(ErrorDocumentation { help, link: Some(link.into()) })
        })
    }

    fn with_contract_info(self, contract_id: impl Into<String>, function: Option<&str>) -> Self {
        self.map_err(|err| {
            err.attach(ContractInfo {
                contract_id: contract_id.into(),
                function: function.map(|f| f.to_string()),
            })
        })
    }
}

/// Remediation hint a UI can render next to the error kind.
pub fn remediation<C: Context>(report: &Report<C>) -> Option<&str> {
    report
        .downcast_ref::<ErrorDocumentation>()
        .map(|d| d.help.as_str())
        .filter(|help| !help.is_empty())
}

/// Most recent printable message attached to the report.
pub fn message<C: Context>(report: &Report<C>) -> Option<String> {
    report.frames().find_map(|frame| match frame.kind() {
        FrameKind::Attachment(AttachmentKind::Printable(printable)) => Some(printable.to_string()),
        _ => None,
    })
}

/// Single line rendering: `<kind>: <message>`.
pub fn summary<C: Context>(report: &Report<C>) -> String {
    match message(report) {
        Some(message) => format!("{}: {}", report.current_context(), message),
        None => report.current_context().to_string(),
    }
}

/// Helper macro for creating errors with a printable message
#[macro_export]
macro_rules! bbox_error {
    ($error:expr, $($arg:tt)*) => {{
        $crate::error_stack::Report::new($error)
            .attach_printable(format!($($arg)*))
    }};
}
