/// Per-platform shape of the synthetic ad feeds.
/// Static tables, no allocation: one `PlatformProfile` per platform.

use crate::state::Platform;

#[derive(Debug, Clone, Copy)]
pub enum RowsPerDay {
    /// Uniform row count per campaign per day, inclusive.
    Between(u32, u32),
    /// A campaign runs on a given day with this probability (one row).
    Chance(f64),
}

/// Normal draw with a lower bound.
#[derive(Debug, Clone, Copy)]
pub struct Floored {
    pub mean: f64,
    pub std: f64,
    pub floor: f64,
}

/// Normal draw clamped to `[min, max]`.
#[derive(Debug, Clone, Copy)]
pub struct Clamped {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug)]
pub struct PlatformProfile {
    /// (campaign name, conversion rate per click)
    pub campaigns: &'static [(&'static str, f64)],
    pub tactics: &'static [&'static str],
    pub rows_per_day: RowsPerDay,
    pub seasonal_amplitude: f64,
    pub impressions: Floored,
    pub ctr: Clamped,
    pub cpc: Floored,
    pub order_value: Floored,
}

static FACEBOOK: PlatformProfile = PlatformProfile {
    campaigns: &[
        ("Brand_Awareness_Q1", 0.01),
        ("Conversion_Campaign_Jan", 0.025),
        ("Retargeting_Feb", 0.035),
        ("Product_Launch_Mar", 0.02),
    ],
    tactics: &["Video_Ads", "Carousel_Ads", "Single_Image", "Collection_Ads"],
    rows_per_day: RowsPerDay::Between(1, 3),
    seasonal_amplitude: 0.3,
    impressions: Floored { mean: 5000.0, std: 1500.0, floor: 100.0 },
    ctr: Clamped { mean: 0.02, std: 0.005, min: 0.005, max: 0.08 },
    cpc: Floored { mean: 1.5, std: 0.5, floor: 0.1 },
    order_value: Floored { mean: 85.0, std: 25.0, floor: 20.0 },
};

// Search and shopping: higher CTR and CPC
static GOOGLE: PlatformProfile = PlatformProfile {
    campaigns: &[
        ("Search_Brand_Terms", 0.04),
        ("Shopping_Campaigns", 0.028),
        ("Display_Remarketing", 0.015),
        ("YouTube_Video_Ads", 0.012),
    ],
    tactics: &["Search_Ads", "Shopping_Ads", "Display_Ads", "Video_Ads"],
    rows_per_day: RowsPerDay::Between(1, 2),
    seasonal_amplitude: 0.2,
    impressions: Floored { mean: 8000.0, std: 2000.0, floor: 200.0 },
    ctr: Clamped { mean: 0.035, std: 0.01, min: 0.01, max: 0.12 },
    cpc: Floored { mean: 2.1, std: 0.7, floor: 0.2 },
    order_value: Floored { mean: 92.0, std: 30.0, floor: 25.0 },
};

// Big reach, low click-out, cheap clicks, smaller baskets
static TIKTOK: PlatformProfile = PlatformProfile {
    campaigns: &[
        ("Gen_Z_Outreach", 0.018),
        ("Trend_Challenge", 0.022),
        ("Influencer_Collab", 0.025),
        ("Product_Demo_Videos", 0.02),
    ],
    tactics: &["In_Feed_Ads", "Spark_Ads", "TopView_Ads", "Branded_Hashtag"],
    rows_per_day: RowsPerDay::Chance(0.7),
    seasonal_amplitude: 0.4,
    impressions: Floored { mean: 12000.0, std: 4000.0, floor: 500.0 },
    ctr: Clamped { mean: 0.015, std: 0.008, min: 0.005, max: 0.06 },
    cpc: Floored { mean: 0.8, std: 0.3, floor: 0.1 },
    order_value: Floored { mean: 65.0, std: 20.0, floor: 15.0 },
};

pub fn profile(platform: Platform) -> &'static PlatformProfile {
    match platform {
        Platform::Facebook => &FACEBOOK,
        Platform::Google => &GOOGLE,
        Platform::TikTok => &TIKTOK,
    }
}
