pub const NAMESPACE: &str = "bbox";

// Listing contract deployments
pub const MAINNET_CONTRACT_ID: &str = "SP000000000000000000002Q6VF78.bbox";
pub const TESTNET_CONTRACT_ID: &str = "ST193GXQTNHVV9WSAPHAB89M6R9QSEXZKS3N9P3DZ.bbox";
pub const DEVNET_CONTRACT_ID: &str = "ST193GXQTNHVV9WSAPHAB89M6R9QSEXZKS3N9P3DZ.bbox";

// Read-only API bases
pub const MAINNET_API_URL: &str = "https://api.mainnet.hiro.so";
pub const TESTNET_API_URL: &str = "https://api.testnet.hiro.so";
pub const DEVNET_API_URL: &str = "http://localhost:3999";

// Contract functions
pub const FN_SUBMIT_APP: &str = "submit-app";
pub const FN_VOTE_APP: &str = "vote-app";
pub const FN_RATE_APP: &str = "rate-app";
pub const FN_GET_LISTING_FEE: &str = "get-listing-fee";
pub const FN_GET_TOTAL_APPS: &str = "get-total-apps";
pub const FN_GET_APP: &str = "get-app";
pub const FN_GET_USER_VOTE: &str = "get-user-vote";
pub const FN_GET_USER_RATING: &str = "get-user-rating";

// Listing fee served when the contract cannot be queried
pub const DEFAULT_LISTING_FEE_TOKEN: &str = "sBTC";
pub const DEFAULT_LISTING_FEE_AMOUNT: u64 = 111111;
pub const SBTC_DECIMALS: u32 = 8;

pub const MIN_RATING: u32 = 1;
pub const MAX_RATING: u32 = 5;

// Wallets
pub const STX_CALL_CONTRACT_METHOD: &str = "stx_callContract";
pub const LEATHER_INSTALL_URL: &str = "https://leather.io/install-extension";
pub const XVERSE_INSTALL_URL: &str = "https://www.xverse.app/download";
pub const DEFAULT_APP_NAME: &str = "BBOX";
pub const DEFAULT_APP_ICON: &str = "/bbox.png";

pub const EXPLORER_URL: &str = "https://explorer.hiro.so";
