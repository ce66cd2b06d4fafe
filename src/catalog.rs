use crate::report::{ReportSpec, Section};

/// The six fixed report topics the catalog serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ExecutiveSummary,
    Healthcare,
    Sales,
    Ecommerce,
    Sports,
    Financial,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::ExecutiveSummary,
        Topic::Healthcare,
        Topic::Sales,
        Topic::Ecommerce,
        Topic::Sports,
        Topic::Financial,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Topic::ExecutiveSummary => "Executive Summary",
            Topic::Healthcare => "Healthcare Analysis",
            Topic::Sales => "Sales Analysis",
            Topic::Ecommerce => "E-commerce Analysis",
            Topic::Sports => "Sports Analytics",
            Topic::Financial => "Financial Analysis",
        }
    }

    /// Well-known artifact identity, one-to-one with the topic.
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            Topic::ExecutiveSummary => "Complete_Executive_Summary",
            Topic::Healthcare => "Healthcare_Analysis",
            Topic::Sales => "Sales_Analysis",
            Topic::Ecommerce => "Ecommerce_Analysis",
            Topic::Sports => "Sports_Analysis",
            Topic::Financial => "Financial_Analysis",
        }
    }

    pub fn artifact_file_name(&self) -> String {
        format!("{}.pdf", self.artifact_stem())
    }

    /// Label offered alongside the artifact on the download surface.
    pub fn download_label(&self) -> String {
        format!("Download {} report", self.display_name())
    }
}

/// Immutable topic → report-spec table, built once at startup. The catalog
/// and the asset store are the only shared state in the system, and both are
/// read-only at runtime.
pub struct Catalog {
    entries: Vec<(Topic, ReportSpec)>,
}

impl Catalog {
    pub fn load() -> Self {
        let entries = Topic::ALL
            .iter()
            .map(|topic| (*topic, build_spec(*topic)))
            .collect();
        Self { entries }
    }

    pub fn spec(&self, topic: Topic) -> &ReportSpec {
        self.entries
            .iter()
            .find(|(t, _)| *t == topic)
            .map(|(_, spec)| spec)
            .expect("catalog covers every topic")
    }

    pub fn iter(&self) -> impl Iterator<Item = (Topic, &ReportSpec)> {
        self.entries.iter().map(|(topic, spec)| (*topic, spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_spec(topic: Topic) -> ReportSpec {
    match topic {
        Topic::ExecutiveSummary => ReportSpec::new("Master Executive Portfolio")
            .with_section(Section::new(
                "Executive Overview",
                &[
                    "This portfolio represents a comprehensive data science suite across five industry verticals: Healthcare, Sales, E-commerce, Sports, and Finance.",
                    "Each module demonstrates a full-stack data lifecycle: from raw data ingestion and cleaning to advanced modeling and visualization.",
                ],
            ))
            .with_section(Section::new(
                "Strategic Methodology",
                &[
                    "We utilized Python-based ETL pipelines to ensure data integrity and Streamlit for interactive deployment.",
                    "Statistical modeling and machine learning (K-Means) were applied to extract non-obvious business patterns.",
                ],
            ))
            // The master summary carries a consolidated image set drawn from
            // the per-topic reports.
            .with_image("healthcare_top_conditions.png")
            .with_image("sales_trend_line.png"),
        Topic::Healthcare => ReportSpec::new("Healthcare EDA Report")
            .with_section(Section::new(
                "Project Summary",
                &[
                    "Objective: Analyze patient demographics and condition prevalence to optimize hospital resource management.",
                    "Technical Approach: Implemented a robust cleaning script that handled missing values and standardized medical terminology across 10,000+ records.",
                ],
            ))
            .with_section(Section::new(
                "Key Findings",
                &[
                    "Identified specific age groups at higher risk for chronic conditions, allowing for targeted preventative care programs.",
                    "Data validation confirmed a 100% completion rate for critical patient fields.",
                ],
            ))
            .with_image("age_distribution_by_condition.png"),
        Topic::Sales => ReportSpec::new("Sales & Revenue Performance")
            .with_section(Section::new(
                "Project Summary",
                &[
                    "Objective: Track revenue growth and identify seasonal trends using historical sales data.",
                    "Technical Approach: Applied time-series resampling (Monthly/Quarterly) and rolling averages to reveal underlying growth patterns.",
                ],
            ))
            .with_section(Section::new(
                "Key Findings",
                &[
                    "Detected a 15% increase in revenue during Q3, driven primarily by specific product categories.",
                    "Customer segmentation revealed that 20% of the client base generates 70% of total revenue.",
                ],
            ))
            .with_image("sales_trend_line.png"),
        Topic::Ecommerce => ReportSpec::new("E-commerce ROI & Attribution")
            .with_section(Section::new(
                "Project Summary",
                &[
                    "Objective: Evaluate marketing channel effectiveness and customer engagement correlations.",
                    "Technical Approach: Performed correlation analysis between 'Time Spent' and 'Purchase Amount' to assess platform stickiness.",
                ],
            ))
            .with_section(Section::new(
                "Key Findings",
                &[
                    "Direct and SEO traffic sources showed the highest conversion rates compared to paid social media.",
                    "A strong positive correlation (0.85) exists between user session duration and total transaction value.",
                ],
            ))
            .with_image("ecommerce_engagement_correlation.png"),
        Topic::Sports => ReportSpec::new("Sports Analytics (K-Means ML)")
            .with_section(Section::new(
                "Project Summary",
                &[
                    "Objective: Automate player scouting by grouping athletes based on multidimensional performance metrics.",
                    "Technical Approach: Deployed an Unsupervised K-Means Clustering algorithm with feature scaling (StandardScaler) to ensure unbiased grouping.",
                ],
            ))
            .with_section(Section::new(
                "Key Findings",
                &[
                    "The model successfully identified three distinct clusters: 'Elite Impact,' 'High Efficiency,' and 'Developmental Talent.'",
                    "This methodology reduces scouting bias by providing objective, data-driven performance tiers.",
                ],
            ))
            .with_image("sports_value_vs_impact.png"),
        Topic::Financial => ReportSpec::new("Financial Market Trends")
            .with_section(Section::new(
                "Project Summary",
                &[
                    "Objective: Analyze stock price movements and market volatility for risk assessment.",
                    "Technical Approach: Calculated 50-day and 200-day Moving Averages to identify market momentum and structural shifts.",
                ],
            ))
            .with_section(Section::new(
                "Key Findings",
                &[
                    "The 50/200-day crossover analysis provided clear signals for market entry and exit strategies.",
                    "Volatility analysis identified periods of high risk where hedging strategies would be most effective.",
                ],
            ))
            .with_image("stock_price_trends_MA.png"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_all_six_topics() {
        let catalog = Catalog::load();
        assert_eq!(catalog.len(), 6);
        for topic in Topic::ALL {
            let spec = catalog.spec(topic);
            assert!(!spec.title.is_empty());
            assert!(!spec.sections.is_empty());
            assert!(!spec.images.is_empty());
        }
    }

    #[test]
    fn artifact_names_are_one_to_one_with_topics() {
        let mut names: Vec<String> = Topic::ALL
            .iter()
            .map(|t| t.artifact_file_name())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
        assert_eq!(
            Topic::Sales.artifact_file_name(),
            "Sales_Analysis.pdf"
        );
        assert_eq!(
            Topic::ExecutiveSummary.artifact_file_name(),
            "Complete_Executive_Summary.pdf"
        );
    }

    #[test]
    fn download_labels_name_the_topic() {
        assert_eq!(
            Topic::Healthcare.download_label(),
            "Download Healthcare Analysis report"
        );
    }

    #[test]
    fn executive_summary_consolidates_images_from_other_topics() {
        let catalog = Catalog::load();
        let spec = catalog.spec(Topic::ExecutiveSummary);
        let names: Vec<&str> = spec.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            ["healthcare_top_conditions.png", "sales_trend_line.png"]
        );
    }
}
