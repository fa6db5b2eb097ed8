//! Domain and template-variant catalogs.
//!
//! Each catalog is a fixed table of word-pool records. Synthesizers select one
//! record per instance and draw every name, label and value range from it, so
//! per-domain behavior lives in data rather than in branches.

use crate::generator::rng::SeededRng;
use crate::generator::Result;
use tracing::debug;

/// A catalog entry addressable by name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Selects a catalog entry.
///
/// Returns the entry named by `hint` when it exists. An unknown hint is
/// ignored and an entry is drawn uniformly instead; no draw is consumed when
/// the hint matches.
pub fn select<'a, T: Named>(
    rng: &mut SeededRng,
    catalog: &'a [T],
    hint: Option<&str>,
    what: &str,
) -> Result<&'a T> {
    if let Some(hint) = hint {
        if let Some(entry) = catalog.iter().find(|entry| entry.name() == hint) {
            return Ok(entry);
        }
        debug!(hint, what, "Ignoring unknown catalog hint");
    }
    rng.pick(catalog, what)
}

// ---------------------------------------------------------------------------
// Code domains (debugging and refactoring)
// ---------------------------------------------------------------------------

/// Word pools for generated Python programs.
#[derive(Debug)]
pub struct CodeDomain {
    pub name: &'static str,
    pub variables: &'static [&'static str],
    pub operations: &'static [&'static str],
    pub outputs: &'static [&'static str],
    pub prefixes: &'static [&'static str],
    /// Plural nouns a script reports having processed.
    pub process_nouns: &'static [&'static str],
}

impl Named for CodeDomain {
    fn name(&self) -> &str {
        self.name
    }
}

pub const CODE_DOMAINS: &[CodeDomain] = &[
    CodeDomain {
        name: "data_processing",
        variables: &["records", "entries", "dataset", "batch", "rows", "items", "documents"],
        operations: &["process", "filter", "sort", "validate", "clean", "transform", "analyze"],
        outputs: &["results", "summary", "report", "output", "processed_data", "final_data"],
        prefixes: &["data", "file", "record", "entry", "batch"],
        process_nouns: &["files", "records", "entries", "documents", "datasets", "batches"],
    },
    CodeDomain {
        name: "web_services",
        variables: &["requests", "responses", "users", "sessions", "endpoints", "clients"],
        operations: &["handle", "route", "authenticate", "validate", "cache", "serve"],
        outputs: &["response", "status", "result", "data", "payload", "json_data"],
        prefixes: &["web", "api", "service", "request", "user"],
        process_nouns: &["requests", "users", "sessions", "endpoints", "responses", "clients"],
    },
    CodeDomain {
        name: "file_management",
        variables: &["files", "documents", "folders", "paths", "archives", "backups"],
        operations: &["backup", "organize", "compress", "sync", "restore", "copy"],
        outputs: &["backup_log", "file_list", "status_report", "summary", "manifest"],
        prefixes: &["file", "backup", "folder", "path", "archive"],
        process_nouns: &["files", "documents", "folders", "backups", "archives", "paths"],
    },
    CodeDomain {
        name: "calculations",
        variables: &["values", "numbers", "measurements", "scores", "totals", "amounts"],
        operations: &["calculate", "compute", "evaluate", "analyze", "sum", "average"],
        outputs: &["result", "total", "average", "final_score", "calculation", "answer"],
        prefixes: &["calc", "math", "num", "value", "score"],
        process_nouns: &["values", "numbers", "measurements", "scores", "calculations", "results"],
    },
    CodeDomain {
        name: "system_admin",
        variables: &["configs", "settings", "parameters", "options", "properties", "values"],
        operations: &["configure", "setup", "initialize", "update", "deploy", "manage"],
        outputs: &["config_file", "system_log", "status", "deployment_report", "log_entry"],
        prefixes: &["config", "system", "admin", "setup", "deploy"],
        process_nouns: &["configs", "settings", "parameters", "properties", "deployments", "logs"],
    },
];

/// Structural shape of a generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptVariant {
    /// Linear script with one `if` block.
    SimpleScript,
    /// Body wrapped in a function that is called at module level.
    FunctionBased,
    /// List built with `range`, then iterated.
    DataProcessing,
    /// Start banner plus an `if`/`else` pair.
    Interactive,
}

impl ScriptVariant {
    pub const ALL: [ScriptVariant; 4] = [
        ScriptVariant::SimpleScript,
        ScriptVariant::FunctionBased,
        ScriptVariant::DataProcessing,
        ScriptVariant::Interactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptVariant::SimpleScript => "simple_script",
            ScriptVariant::FunctionBased => "function_based",
            ScriptVariant::DataProcessing => "data_processing",
            ScriptVariant::Interactive => "interactive",
        }
    }
}

impl Named for ScriptVariant {
    fn name(&self) -> &str {
        self.as_str()
    }
}

// ---------------------------------------------------------------------------
// Data scenarios (tabular data reporting)
// ---------------------------------------------------------------------------

/// Range used for single-value transfer tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRange {
    /// Inclusive integer range.
    Whole(i64, i64),
    /// Uniform float range, rounded to one decimal place.
    Tenths(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Count,
    Average,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Count => "COUNT",
            Aggregation::Average => "AVERAGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calculation {
    SumColumns,
    MultiplyColumns,
    AverageColumnA,
}

impl Calculation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Calculation::SumColumns => "sum_columns",
            Calculation::MultiplyColumns => "multiply_columns",
            Calculation::AverageColumnA => "average_column_a",
        }
    }
}

/// Phrasing for one two-column calculation.
#[derive(Debug, Clone, Copy)]
pub struct CalculationPhrase {
    pub calculation: Calculation,
    /// What the agent is asked to calculate.
    pub description: &'static str,
    /// What the result cell holds.
    pub result_name: &'static str,
}

/// Word pools and value ranges for a data-reporting scenario.
#[derive(Debug)]
pub struct DataScenario {
    pub name: &'static str,
    pub data_types: &'static [&'static str],
    pub operations: &'static [&'static str],
    pub contexts: &'static [&'static str],
    pub file_prefixes: &'static [&'static str],
    pub low: ValueRange,
    pub medium: (i64, i64),
    pub high: (i64, i64),
    pub action_verb: &'static str,
    pub aggregations: [(Aggregation, &'static str); 3],
    pub calculations: [CalculationPhrase; 3],
    /// Column headers of the two-column spreadsheet.
    pub headers: [&'static str; 2],
}

impl Named for DataScenario {
    fn name(&self) -> &str {
        self.name
    }
}

const fn phrase(
    calculation: Calculation,
    description: &'static str,
    result_name: &'static str,
) -> CalculationPhrase {
    CalculationPhrase {
        calculation,
        description,
        result_name,
    }
}

pub const DATA_SCENARIOS: &[DataScenario] = &[
    DataScenario {
        name: "business_analytics",
        data_types: &["sales_records", "customer_data", "revenue_figures", "performance_metrics", "quarterly_reports"],
        operations: &["analyze", "summarize", "calculate", "aggregate", "evaluate"],
        contexts: &["monthly sales", "customer analytics", "profit margins", "growth metrics", "business KPIs"],
        file_prefixes: &["sales", "revenue", "customers", "metrics", "reports"],
        low: ValueRange::Whole(100, 500),
        medium: (500, 2000),
        high: (2000, 10000),
        action_verb: "analyze and process",
        aggregations: [
            (Aggregation::Sum, "total revenue"),
            (Aggregation::Count, "number of records"),
            (Aggregation::Average, "average value"),
        ],
        calculations: [
            phrase(Calculation::SumColumns, "calculate total business performance (revenue + costs)", "combined business total"),
            phrase(Calculation::MultiplyColumns, "calculate revenue efficiency (revenue × cost ratio)", "efficiency score"),
            phrase(Calculation::AverageColumnA, "calculate average revenue", "mean revenue"),
        ],
        headers: ["Revenue", "Costs"],
    },
    DataScenario {
        name: "scientific_research",
        data_types: &["measurements", "observations", "test_results", "sample_data", "experiment_records"],
        operations: &["measure", "observe", "calculate", "analyze", "validate"],
        contexts: &["lab experiments", "field studies", "research data", "clinical trials", "sensor readings"],
        file_prefixes: &["experiment", "lab", "research", "study", "measurements"],
        low: ValueRange::Tenths(0.1, 10.0),
        medium: (10, 100),
        high: (100, 1000),
        action_verb: "examine and calculate",
        aggregations: [
            (Aggregation::Sum, "total measurements"),
            (Aggregation::Count, "sample count"),
            (Aggregation::Average, "mean value"),
        ],
        calculations: [
            phrase(Calculation::SumColumns, "calculate total sensor readings (Sensor_A + Sensor_B)", "combined sensor total"),
            phrase(Calculation::MultiplyColumns, "calculate interaction coefficient (Sensor_A × Sensor_B)", "interaction result"),
            phrase(Calculation::AverageColumnA, "calculate average Sensor_A reading", "mean sensor value"),
        ],
        headers: ["Sensor_A", "Sensor_B"],
    },
    DataScenario {
        name: "education_management",
        data_types: &["student_scores", "grade_records", "attendance_data", "course_evaluations", "academic_metrics"],
        operations: &["grade", "evaluate", "calculate", "track", "assess"],
        contexts: &["student performance", "course grades", "class averages", "academic progress", "test scores"],
        file_prefixes: &["grades", "students", "scores", "class", "academic"],
        low: ValueRange::Whole(0, 50),
        medium: (50, 85),
        high: (85, 100),
        action_verb: "evaluate and compute",
        aggregations: [
            (Aggregation::Sum, "total points"),
            (Aggregation::Count, "number of students"),
            (Aggregation::Average, "class average"),
        ],
        calculations: [
            phrase(Calculation::SumColumns, "calculate total test scores (Test_1 + Test_2)", "overall score total"),
            phrase(Calculation::MultiplyColumns, "calculate weighted performance (Test_1 × Test_2)", "performance index"),
            phrase(Calculation::AverageColumnA, "calculate average Test_1 score", "mean test score"),
        ],
        headers: ["Test_1", "Test_2"],
    },
    DataScenario {
        name: "inventory_logistics",
        data_types: &["stock_levels", "inventory_counts", "shipment_records", "warehouse_data", "supply_metrics"],
        operations: &["count", "track", "manage", "calculate", "monitor"],
        contexts: &["warehouse inventory", "stock management", "supply levels", "shipment tracking", "logistics data"],
        file_prefixes: &["inventory", "stock", "warehouse", "shipment", "supplies"],
        low: ValueRange::Whole(10, 100),
        medium: (100, 1000),
        high: (1000, 5000),
        action_verb: "count and summarize",
        aggregations: [
            (Aggregation::Sum, "total inventory"),
            (Aggregation::Count, "item count"),
            (Aggregation::Average, "average stock level"),
        ],
        calculations: [
            phrase(Calculation::SumColumns, "calculate total stock levels (Stock_A + Stock_B)", "combined inventory"),
            phrase(Calculation::MultiplyColumns, "calculate stock turnover (Stock_A × Stock_B)", "turnover rate"),
            phrase(Calculation::AverageColumnA, "calculate average Stock_A level", "mean stock level"),
        ],
        headers: ["Stock_A", "Stock_B"],
    },
    DataScenario {
        name: "financial_planning",
        data_types: &["budget_items", "expense_records", "financial_data", "cost_analysis", "investment_figures"],
        operations: &["budget", "calculate", "plan", "analyze", "forecast"],
        contexts: &["budget planning", "expense tracking", "financial analysis", "cost management", "investment planning"],
        file_prefixes: &["budget", "expenses", "financial", "costs", "investments"],
        low: ValueRange::Whole(50, 500),
        medium: (500, 5000),
        high: (5000, 50000),
        action_verb: "review and calculate",
        aggregations: [
            (Aggregation::Sum, "total amount"),
            (Aggregation::Count, "number of items"),
            (Aggregation::Average, "average cost"),
        ],
        calculations: [
            phrase(Calculation::SumColumns, "calculate total financial flow (Income + Expenses)", "combined total"),
            phrase(Calculation::MultiplyColumns, "calculate financial impact (Income × Expenses)", "impact value"),
            phrase(Calculation::AverageColumnA, "calculate average income", "mean income"),
        ],
        headers: ["Income", "Expenses"],
    },
];

/// Layout of a generated data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    SimpleValues,
    LabeledEntries,
    StructuredRecords,
    FormattedReports,
}

impl DataFormat {
    pub const ALL: [DataFormat; 4] = [
        DataFormat::SimpleValues,
        DataFormat::LabeledEntries,
        DataFormat::StructuredRecords,
        DataFormat::FormattedReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::SimpleValues => "simple_values",
            DataFormat::LabeledEntries => "labeled_entries",
            DataFormat::StructuredRecords => "structured_records",
            DataFormat::FormattedReports => "formatted_reports",
        }
    }
}

impl Named for DataFormat {
    fn name(&self) -> &str {
        self.as_str()
    }
}

// ---------------------------------------------------------------------------
// Research domains (research synthesis)
// ---------------------------------------------------------------------------

/// Entity data for generated web pages.
#[derive(Debug)]
pub struct ResearchDomain {
    pub name: &'static str,
    pub companies: &'static [&'static str],
    pub price_range: (i64, i64),
    pub founded_range: (i64, i64),
    pub products: &'static [&'static str],
    /// Accent colours for the page stylesheet.
    pub colors: &'static [&'static str],
    pub events: &'static [&'static str],
    /// Two-line documents offered for download.
    pub documents: &'static [&'static str],
}

impl Named for ResearchDomain {
    fn name(&self) -> &str {
        self.name
    }
}

pub const RESEARCH_DOMAINS: &[ResearchDomain] = &[
    ResearchDomain {
        name: "technology",
        companies: &[
            "TechFlow", "DataCorp", "InnovateAI", "CodeCraft", "ByteStream", "CloudTech",
            "DevTools Pro", "SmartCode", "TechVision", "DigitalEdge", "CyberSoft", "NetLogic",
        ],
        price_range: (99, 1999),
        founded_range: (1995, 2015),
        products: &[
            "Software Platform", "Mobile App", "AI Tool", "Cloud Service", "Development Framework",
            "Data Analytics Suite", "Security Software", "Project Management Tool", "API Gateway",
            "Machine Learning Platform",
        ],
        colors: &["#2563eb", "#1e40af", "#3730a3"],
        events: &["Tech Conference", "Developer Summit", "AI Workshop", "Startup Showcase"],
        documents: &[
            "API Documentation\nComplete technical specifications.",
            "Product Roadmap\nQuarterly development milestones.",
            "System Requirements\nMinimum specifications needed.",
        ],
    },
    ResearchDomain {
        name: "healthcare",
        companies: &[
            "MedCare", "HealthTech", "WellnessPlus", "CareLink", "MedFlow", "HealthCore",
            "MedSoft", "CareSystem", "HealthPro", "MedNet", "WellCare", "HealthLink",
        ],
        price_range: (29, 299),
        founded_range: (1985, 2010),
        products: &[
            "Health Monitor", "Medical Device", "Wellness App", "Patient Portal",
            "Telemedicine Platform", "Health Tracker", "Medical Software", "Diagnostic Tool",
            "Health Analytics", "Patient Management System",
        ],
        colors: &["#059669", "#047857", "#065f46"],
        events: &["Medical Conference", "Health Summit", "Wellness Workshop", "Care Innovation"],
        documents: &[
            "Clinical Guidelines\nPatient care standards.",
            "Health Report\nQuarterly outcome analysis.",
            "Device Manual\nOperation instructions included.",
        ],
    },
    ResearchDomain {
        name: "finance",
        companies: &[
            "FinTech Pro", "MoneyFlow", "CreditCore", "PayLink", "FinBase", "BankTech",
            "PayFlow", "FinSoft", "MoneyTech", "CreditPro", "FinCore", "PaySystem",
        ],
        price_range: (199, 2999),
        founded_range: (1990, 2010),
        products: &[
            "Trading Platform", "Payment Gateway", "Financial Analytics", "Investment Tool",
            "Banking Software", "Credit Management", "Risk Assessment Tool", "Portfolio Tracker",
            "Accounting Software", "Financial Dashboard",
        ],
        colors: &["#dc2626", "#b91c1c", "#991b1b"],
        events: &["Financial Summit", "Investment Conference", "FinTech Expo", "Banking Workshop"],
        documents: &[
            "Investment Analysis\nMarket performance review.",
            "Compliance Report\nRegulatory audit results.",
            "Risk Guidelines\nAssessment framework outlined.",
        ],
    },
    ResearchDomain {
        name: "education",
        companies: &[
            "EduTech", "LearnFlow", "StudyPro", "EduCore", "LearnLink", "StudyTech",
            "EduSoft", "LearnPro", "StudyFlow", "EduNet", "LearnCore", "StudyLink",
        ],
        price_range: (49, 499),
        founded_range: (1988, 2012),
        products: &[
            "Learning Platform", "Study App", "Course Management System", "Student Portal",
            "Educational Software", "Virtual Classroom", "Assessment Tool", "Learning Analytics",
            "Study Tracker", "Educational Content Platform",
        ],
        colors: &["#7c3aed", "#6d28d9", "#5b21b6"],
        events: &["Education Conference", "Learning Summit", "Teaching Workshop", "Academic Expo"],
        documents: &[
            "Curriculum Guidelines\nLearning objectives defined.",
            "Performance Report\nStudent achievement metrics.",
            "Teaching Manual\nInstructional resources provided.",
        ],
    },
    ResearchDomain {
        name: "retail",
        companies: &[
            "ShopTech", "RetailPro", "StoreFlow", "SaleTech", "ShopCore", "RetailFlow",
            "StorePro", "SaleCore", "ShopLink", "RetailNet", "StoreCore", "SaleFlow",
        ],
        price_range: (19, 199),
        founded_range: (1992, 2015),
        products: &[
            "E-commerce Platform", "POS System", "Inventory Management", "Customer Portal",
            "Sales Analytics", "Product Catalog", "Order Management", "Retail Software",
            "Store Management", "Customer Relationship Tool",
        ],
        colors: &["#ea580c", "#dc2626", "#b91c1c"],
        events: &["Retail Expo", "Commerce Summit", "Sales Conference", "Customer Workshop"],
        documents: &[
            "Sales Report\nQuarterly revenue analysis.",
            "Inventory Guide\nStock control procedures.",
            "Service Manual\nCustomer support standards.",
        ],
    },
    ResearchDomain {
        name: "manufacturing",
        companies: &[
            "ManuTech", "ProducePro", "FactoryFlow", "MakeCore", "BuildTech", "ManuFlow",
            "ProduceTech", "FactoryPro", "MakeFlow", "BuildCore", "ManuCore", "ProduceFlow",
        ],
        price_range: (499, 4999),
        founded_range: (1980, 2005),
        products: &[
            "Production Software", "Quality Control System", "Supply Chain Tool",
            "Manufacturing Platform", "Process Management", "Factory Analytics",
            "Equipment Monitor", "Production Tracker", "Quality Assurance Tool",
            "Manufacturing Dashboard",
        ],
        colors: &["#6b7280", "#4b5563", "#374151"],
        events: &["Manufacturing Expo", "Industry Summit", "Production Conference", "Quality Workshop"],
        documents: &[
            "Quality Manual\nProduction testing standards.",
            "Efficiency Report\nOperational performance analysis.",
            "Safety Manual\nWorkplace protection protocols.",
        ],
    },
    ResearchDomain {
        name: "food_beverage",
        companies: &[
            "FoodTech", "BeveragePro", "TasteFlow", "FreshCore", "FlavorTech", "FoodFlow",
            "BeverageFlow", "TastePro", "FreshFlow", "FlavorCore", "FoodCore", "BeverageCore",
        ],
        price_range: (9, 89),
        founded_range: (1995, 2018),
        products: &[
            "Recipe Management", "Nutrition Tracker", "Food Safety System", "Menu Planning Tool",
            "Inventory System", "Quality Control", "Restaurant POS", "Food Analytics",
            "Delivery Platform", "Nutrition Software",
        ],
        colors: &["#16a34a", "#15803d", "#166534"],
        events: &["Food Expo", "Culinary Summit", "Nutrition Conference", "Taste Workshop"],
        documents: &[
            "Safety Guidelines\nHACCP quality standards.",
            "Nutrition Report\nHealth content analysis.",
            "Recipe Manual\nCulinary preparation standards.",
        ],
    },
    ResearchDomain {
        name: "professional_services",
        companies: &[
            "ServicePro", "ConsultTech", "ProFlow", "ServiceCore", "ConsultPro", "ProTech",
            "ServiceFlow", "ConsultCore", "ProCore", "ServiceTech", "ConsultFlow", "ProLink",
        ],
        price_range: (99, 999),
        founded_range: (1985, 2012),
        products: &[
            "Consulting Platform", "Project Management", "Client Portal", "Service Management",
            "Professional Tools", "Business Analytics", "Client Relationship System",
            "Service Tracking", "Professional Dashboard", "Business Intelligence Tool",
        ],
        colors: &["#0891b2", "#0e7490", "#155e75"],
        events: &["Professional Summit", "Service Expo", "Business Conference", "Client Workshop"],
        documents: &[
            "Consulting Guide\nProject delivery framework.",
            "Engagement Report\nClient satisfaction analysis.",
            "Development Guide\nSkill enhancement opportunities.",
        ],
    },
];

pub const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Corp", "Ltd", "Solutions"];

pub const EMPLOYEE_BANDS: &[&str] = &["25-50", "50-100", "100-250", "250-500", "500-1000", "1000+"];

pub const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Austin, TX",
    "Seattle, WA",
    "Boston, MA",
    "Denver, CO",
    "Atlanta, GA",
    "Chicago, IL",
    "Los Angeles, CA",
    "Miami, FL",
];

pub const EVENT_VENUES: &[&str] = &["Convention Center", "Hotel Ballroom", "Conference Hall", "Event Center"];

pub const AREA_CODES: &[&str] = &["555", "415", "212", "713", "206", "617", "303", "404", "312", "310"];

pub const EMAIL_PREFIXES: &[&str] = &["info", "contact", "support", "hello", "sales", "service"];

pub const EMAIL_DOMAINS: &[&str] = &["company.com", "business.com", "corp.com", "enterprise.com", "group.com"];

/// Page layout of a generated web page. Each layout belongs to one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    CompanyInfo,
    ProductInfo,
    EventInfo,
    ProductCatalog,
    ContactInfo,
    DocumentRepository,
}

impl PageLayout {
    pub const ALL: [PageLayout; 6] = [
        PageLayout::CompanyInfo,
        PageLayout::ProductInfo,
        PageLayout::EventInfo,
        PageLayout::ProductCatalog,
        PageLayout::ContactInfo,
        PageLayout::DocumentRepository,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageLayout::CompanyInfo => "company_info",
            PageLayout::ProductInfo => "product_info",
            PageLayout::EventInfo => "event_info",
            PageLayout::ProductCatalog => "product_catalog",
            PageLayout::ContactInfo => "contact_info",
            PageLayout::DocumentRepository => "document_repository",
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            PageLayout::CompanyInfo | PageLayout::ProductInfo | PageLayout::EventInfo => 1,
            PageLayout::ProductCatalog | PageLayout::ContactInfo => 2,
            PageLayout::DocumentRepository => 3,
        }
    }

    /// Layouts available at a level, in catalog order.
    pub fn for_level(level: u8) -> Vec<PageLayout> {
        Self::ALL
            .iter()
            .copied()
            .filter(|layout| layout.level() == level)
            .collect()
    }
}

impl Named for PageLayout {
    fn name(&self) -> &str {
        self.as_str()
    }
}
