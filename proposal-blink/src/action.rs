//! Construction of action descriptors, links and the routing manifest.

use crate::config::ServiceConfig;
use crate::dtos::{
    ActionDescriptor, ActionKind, ActionRule, ActionsManifest, LinkKind, LinkedAction,
    LinkedActions, RedirectDescriptor,
};
use crate::error::{ApiError, ApiResult};
use crate::indexer::ProposalDetails;

pub const ICON_URL: &str =
    "https://imagedelivery.net/HYEnlujCFMCgj6yA728xIw/c86809b4-f37e-4a77-4a47-608533a97900/public";
pub const ACTION_LABEL: &str = "Proposal link";
pub const TRADE_LABEL: &str = "Trade proposal";
pub const LINK_PATH: &str = "/api/proposal-link/link";

/// Builds the action for a looked-up proposal. Fails when the DAO slug is missing.
pub fn proposal_action(
    config: &ServiceConfig,
    proposal_account: &str,
    details: &ProposalDetails,
) -> ApiResult<ActionDescriptor> {
    let slug = details.dao_slug().ok_or(ApiError::DaoSlugNotFound)?;

    Ok(ActionDescriptor {
        kind: ActionKind::Action,
        icon: ICON_URL.to_string(),
        title: details.title.clone().unwrap_or_default(),
        label: ACTION_LABEL.to_string(),
        description: String::new(),
        links: LinkedActions {
            actions: vec![LinkedAction {
                kind: LinkKind::ExternalLink,
                label: TRADE_LABEL.to_string(),
                href: link_href(&config.base_url, proposal_account, slug),
            }],
        },
    })
}

/// URL of this service's link endpoint carrying the account and slug.
pub fn link_href(base_url: &str, proposal_account: &str, slug: &str) -> String {
    let query = serde_urlencoded::to_string(&[("proposalAccount", proposal_account), ("slug", slug)])
        // Serializing a slice of string pairs cannot fail.
        .unwrap_or_default();
    format!("{}{}?{}", base_url.trim_end_matches('/'), LINK_PATH, query)
}

pub fn external_link(app_host: &str, slug: &str, proposal_account: &str) -> String {
    format!("https://{app_host}/{slug}/trade/{proposal_account}")
}

pub fn redirect(app_host: &str, slug: &str, proposal_account: &str) -> RedirectDescriptor {
    RedirectDescriptor {
        kind: LinkKind::ExternalLink,
        external_link: external_link(app_host, slug, proposal_account),
    }
}

pub fn actions_manifest() -> ActionsManifest {
    ActionsManifest {
        rules: vec![
            ActionRule {
                path_pattern: "/*".to_string(),
                api_path: "/api/proposal-link/*".to_string(),
            },
            ActionRule {
                path_pattern: "/api/proposal-link/**".to_string(),
                api_path: "/api/proposal-link/**".to_string(),
            },
        ],
    }
}
