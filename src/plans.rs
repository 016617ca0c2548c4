//! Subscription plan catalog: a static read-only lookup table consulted by
//! the dispatcher. Prices are configuration, not contract.

use serde::{Deserialize, Serialize};

/// Subscription tier held by a user session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl Plan {
    /// Token suffix used in `select_<plan>` / `upgrade_<plan>` callbacks.
    pub fn slug(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Basic => "basic",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Plan> {
        match slug {
            "free" => Some(Plan::Free),
            "basic" => Some(Plan::Basic),
            "pro" => Some(Plan::Pro),
            "enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    /// Paid tiers go through the payment gateway; Free and Enterprise do not.
    pub fn is_paid(&self) -> bool {
        matches!(self, Plan::Basic | Plan::Pro)
    }
}

/// One row of the plan catalog.
#[derive(Debug)]
pub struct PlanInfo {
    pub plan: Plan,
    pub display_name: &'static str,
    /// Monthly price in RUB; `None` means custom/negotiated pricing.
    pub monthly_price_rub: Option<u32>,
    pub features: &'static [&'static str],
}

pub const CATALOG: [PlanInfo; 4] = [
    PlanInfo {
        plan: Plan::Free,
        display_name: "Free",
        monthly_price_rub: Some(0),
        features: &[
            "Up to 5 demo cards",
            "Basic templates",
            "Limited AI generations",
            "Watermarked cards",
        ],
    },
    PlanInfo {
        plan: Plan::Basic,
        display_name: "Basic",
        monthly_price_rub: Some(990),
        features: &[
            "For sole traders and freelancers",
            "Unlimited cards",
            "No watermarks",
            "Full template library",
        ],
    },
    PlanInfo {
        plan: Plan::Pro,
        display_name: "Pro",
        monthly_price_rub: Some(4990),
        features: &[
            "For small businesses and agencies",
            "Team collaboration",
            "Integration API",
            "Advanced analytics",
        ],
    },
    PlanInfo {
        plan: Plan::Enterprise,
        display_name: "Enterprise",
        monthly_price_rub: None,
        features: &[
            "For large brands",
            "Unlimited usage",
            "Dedicated manager",
            "Custom integrations",
        ],
    },
];

/// Look up the catalog entry for a plan.
pub fn plan_info(plan: Plan) -> &'static PlanInfo {
    CATALOG
        .iter()
        .find(|info| info.plan == plan)
        .expect("catalog covers every plan")
}
