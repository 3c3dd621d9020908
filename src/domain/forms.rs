//! The dealership's two application wizards.

use super::definition::{ContactFields, Message, NoteEntry, Rule, StepSpec, WizardDefinition};
use super::fields::{FieldKind, FieldSpec, Fields};

pub const VEHICLE_TYPES: &[&str] = &["coupe", "hatchback", "sedan", "minivan", "suv", "truck"];

pub const BUDGETS: &[&str] = &[
    "Under $400 / Month",
    "$400 - $499 / Month",
    "$500 - $600 / Month",
    "Over $600 / Month",
];

pub const TRADE_IN: &[&str] = &["Yes", "No", "Unsure"];

pub const CREDIT_RATINGS: &[&str] = &["excellent", "very-good", "good", "fair", "poor", "no-credit"];

pub const EMPLOYMENT: &[&str] = &["Employed", "Self-Employed", "Student", "Retired / Pension", "Other"];

pub const INCOME_ANNUAL: &str = "I know my annual salary";
pub const INCOME_HOURLY: &str = "I know my hourly wage";
pub const INCOME_MONTHLY: &str = "I know my monthly income";
pub const INCOME_OTHER: &str = "Other";

pub const INCOME_TYPES: &[&str] = &[INCOME_ANNUAL, INCOME_HOURLY, INCOME_MONTHLY, INCOME_OTHER];

pub const HOUSING: &[&str] = &["rent", "own"];

/// Income figures required for each disclosure method.
pub const INCOME_REQUIREMENTS: &[(&str, &[Rule])] = &[
    (INCOME_ANNUAL, &[Rule::Required(&["annualIncome"])]),
    (INCOME_HOURLY, &[Rule::Required(&["hourlyWage", "hoursPerWeek"])]),
    (INCOME_MONTHLY, &[Rule::Required(&["monthlyIncome"])]),
    (INCOME_OTHER, &[Rule::Required(&["monthlyIncome"])]),
];

const INCOME_MISSING: &[(&str, &str)] = &[
    ("annualIncome", "Please enter your annual income"),
    ("hourlyWage", "Please enter your hourly wage and hours per week"),
    ("hoursPerWeek", "Please enter your hourly wage and hours per week"),
    ("monthlyIncome", "Please enter your monthly income"),
];

pub const SIN_LENGTH: usize = 9;

pub const MIN_AGE: i64 = 17;
pub const MAX_AGE: i64 = 100;

const PRE_APPROVAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("vehicleType", "Vehicle type", FieldKind::Choice(VEHICLE_TYPES)),
    FieldSpec::new("budget", "Monthly budget", FieldKind::Choice(BUDGETS)),
    FieldSpec::new("tradeIn", "Trade-in", FieldKind::Choice(TRADE_IN)),
    FieldSpec::new("creditRating", "Credit rating", FieldKind::Choice(CREDIT_RATINGS)),
    FieldSpec::new("employmentStatus", "Employment status", FieldKind::Choice(EMPLOYMENT)),
    FieldSpec::new("incomeType", "How do you know your income?", FieldKind::Choice(INCOME_TYPES)),
    FieldSpec::new("annualIncome", "Annual income", FieldKind::Currency),
    FieldSpec::new("hourlyWage", "Hourly wage", FieldKind::Currency),
    FieldSpec::new("hoursPerWeek", "Hours per week", FieldKind::Digits),
    FieldSpec::new("monthlyIncome", "Monthly income", FieldKind::Currency),
    FieldSpec::new("employerName", "Employer name", FieldKind::Text),
    FieldSpec::new("employerPhone", "Employer phone", FieldKind::Text),
    FieldSpec::new("jobTitle", "Job title", FieldKind::Text),
    FieldSpec::new("yearsEmployed", "Years employed", FieldKind::Digits),
    FieldSpec::new("address", "Street address", FieldKind::Text),
    FieldSpec::new("yearsAtAddress", "Years", FieldKind::Digits),
    FieldSpec::new("monthsAtAddress", "Months", FieldKind::Digits),
    FieldSpec::new("rentOrOwn", "Rent or own", FieldKind::Choice(HOUSING)),
    FieldSpec::new("monthlyHousePayment", "Monthly payment", FieldKind::Currency),
    FieldSpec::new("dob", "Date of birth (DDMMYYYY)", FieldKind::Date),
    FieldSpec::new("age", "Age", FieldKind::Derived { from: "dob" }),
    FieldSpec::new("firstName", "First name", FieldKind::Text),
    FieldSpec::new("lastName", "Last name", FieldKind::Text),
    FieldSpec::new("email", "Email", FieldKind::Text),
    FieldSpec::new("phone", "Phone number", FieldKind::Text),
    FieldSpec::new("sin", "SIN (optional)", FieldKind::DigitsUpTo(SIN_LENGTH)),
];

const PRE_APPROVAL_STEPS: &[StepSpec] = &[
    StepSpec {
        title: "What type of vehicle are you looking for?",
        fields: &["vehicleType"],
        rules: &[Rule::Choice("vehicleType")],
        missing: "Please select a vehicle type",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your monthly budget?",
        fields: &["budget"],
        rules: &[Rule::Choice("budget")],
        missing: "Please select your budget",
        field_missing: &[],
    },
    StepSpec {
        title: "Do you have a trade-in?",
        fields: &["tradeIn"],
        rules: &[Rule::Choice("tradeIn")],
        missing: "Please select if you have a trade-in",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your credit rating?",
        fields: &["creditRating"],
        rules: &[Rule::Choice("creditRating")],
        missing: "Please select your credit rating",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your employment status?",
        fields: &["employmentStatus"],
        rules: &[Rule::Choice("employmentStatus")],
        missing: "Please select your employment status",
        field_missing: &[],
    },
    StepSpec {
        title: "How do you know your income?",
        fields: &["incomeType"],
        rules: &[Rule::Choice("incomeType")],
        missing: "Please select how you know your income",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your income?",
        fields: &["annualIncome", "hourlyWage", "hoursPerWeek", "monthlyIncome"],
        rules: &[Rule::Branch { selector: "incomeType", branches: INCOME_REQUIREMENTS }],
        missing: "Please enter your income",
        field_missing: INCOME_MISSING,
    },
    StepSpec {
        title: "Where do you work?",
        fields: &["employerName", "jobTitle", "employerPhone", "yearsEmployed"],
        rules: &[Rule::Required(&["employerName", "jobTitle"]), Rule::OptionalDigits("yearsEmployed")],
        missing: "Please enter your employer details",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your address?",
        fields: &["address"],
        rules: &[Rule::Required(&["address"])],
        missing: "Please enter your address",
        field_missing: &[],
    },
    StepSpec {
        title: "How long have you lived there?",
        fields: &["yearsAtAddress", "monthsAtAddress"],
        rules: &[Rule::Tenure { years: "yearsAtAddress", months: "monthsAtAddress" }],
        missing: "Please enter how long you've been at this address",
        field_missing: &[],
    },
    StepSpec {
        title: "Do you rent or own?",
        fields: &["rentOrOwn", "monthlyHousePayment"],
        rules: &[Rule::Choice("rentOrOwn"), Rule::Required(&["monthlyHousePayment"])],
        missing: "Please complete all housing information",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your date of birth?",
        fields: &["dob"],
        rules: &[Rule::Age { date: "dob", age: "age", min: MIN_AGE, max: MAX_AGE }],
        missing: "Please enter your date of birth",
        field_missing: &[],
    },
    StepSpec {
        title: "How can we reach you?",
        fields: &["firstName", "lastName", "email", "phone", "sin"],
        rules: &[Rule::Required(&["firstName", "lastName", "email", "phone"]), Rule::Email("email")],
        missing: "Please complete all required fields",
        field_missing: &[],
    },
];

const PRE_APPROVAL_NOTES: &[NoteEntry] = &[
    NoteEntry::Field { key: "vehicleType", field: "vehicleType" },
    NoteEntry::Field { key: "budget", field: "budget" },
    NoteEntry::Field { key: "tradeIn", field: "tradeIn" },
    NoteEntry::Field { key: "creditRating", field: "creditRating" },
    NoteEntry::Field { key: "employmentStatus", field: "employmentStatus" },
    NoteEntry::Group {
        key: "incomeDetails",
        entries: &[
            ("type", "incomeType"),
            ("annualIncome", "annualIncome"),
            ("hourlyWage", "hourlyWage"),
            ("hoursPerWeek", "hoursPerWeek"),
            ("monthlyIncome", "monthlyIncome"),
        ],
    },
    NoteEntry::Group {
        key: "employerDetails",
        entries: &[
            ("name", "employerName"),
            ("phone", "employerPhone"),
            ("jobTitle", "jobTitle"),
            ("yearsEmployed", "yearsEmployed"),
        ],
    },
    NoteEntry::Field { key: "address", field: "address" },
    NoteEntry::Group {
        key: "timeAtAddress",
        entries: &[("years", "yearsAtAddress"), ("months", "monthsAtAddress")],
    },
    NoteEntry::Group {
        key: "housing",
        entries: &[("rentOrOwn", "rentOrOwn"), ("monthlyPayment", "monthlyHousePayment")],
    },
    NoteEntry::Field { key: "dateOfBirth", field: "dob" },
    NoteEntry::Field { key: "age", field: "age" },
    NoteEntry::Field { key: "sin", field: "sin" },
];

fn pre_approval_summary(fields: &Fields) -> String {
    format!(
        "Pre-Approval Application\n\nVehicle Type: {}\nBudget: {}\nTrade-In: {}\nCredit Rating: {}",
        fields.text("vehicleType"),
        fields.text("budget"),
        fields.text("tradeIn"),
        fields.text("creditRating"),
    )
}

/// Financing pre-approval.
pub static PRE_APPROVAL: WizardDefinition = WizardDefinition {
    id: "pre_approval",
    name: "Get Pre-Approved",
    storage_key: "car_street_lead_v1",
    fields: PRE_APPROVAL_FIELDS,
    steps: PRE_APPROVAL_STEPS,
    contact: ContactFields { first_name: "firstName", last_name: "lastName", email: "email", phone: "phone" },
    notes: PRE_APPROVAL_NOTES,
    summary: pre_approval_summary,
    submitted: Message {
        title: "Application Submitted!",
        detail: "We'll review your application and get back to you soon.",
    },
    submit_failed: Message { title: "Submission Failed", detail: "Please try again or contact us directly." },
    edit_shortcuts: &[],
};

pub const INPUT_METHODS: &[&str] = &["details", "vin"];
pub const TRANSMISSIONS: &[&str] = &["automatic", "manual"];
pub const VIN_LENGTH: usize = 17;

const VEHICLE_IDENTITY: &[(&str, &[Rule])] = &[
    ("details", &[Rule::Required(&["year", "make", "model"])]),
    ("vin", &[Rule::MinLength { field: "vin", min: VIN_LENGTH }]),
];

const CONDITION_FLAGS: &[&str] = &[
    "hasExteriorDamage",
    "hasInteriorDamage",
    "hasAccidents",
    "hasMechanicalIssues",
    "hasWarningLights",
];

const SELL_MY_CAR_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("inputMethod", "Identify by", FieldKind::Choice(INPUT_METHODS)).with_initial("details"),
    FieldSpec::new("year", "Year", FieldKind::Digits),
    FieldSpec::new("make", "Make", FieldKind::Text),
    FieldSpec::new("model", "Model", FieldKind::Text),
    FieldSpec::new("trim", "Trim", FieldKind::Text),
    FieldSpec::new("vin", "VIN", FieldKind::Text),
    FieldSpec::new("odometer", "Odometer (km)", FieldKind::Currency),
    FieldSpec::new("exteriorColor", "Exterior color", FieldKind::Text),
    FieldSpec::new("interiorColor", "Interior color", FieldKind::Text),
    FieldSpec::new("transmission", "Transmission", FieldKind::Choice(TRANSMISSIONS)),
    FieldSpec::new("hasExteriorDamage", "Exterior damage?", FieldKind::Flag),
    FieldSpec::new("hasInteriorDamage", "Interior damage?", FieldKind::Flag),
    FieldSpec::new("hasAccidents", "Previous accidents?", FieldKind::Flag),
    FieldSpec::new("hasMechanicalIssues", "Mechanical issues?", FieldKind::Flag),
    FieldSpec::new("hasWarningLights", "Warning lights on?", FieldKind::Flag),
    FieldSpec::new("numberOfKeys", "Number of keys", FieldKind::Digits),
    FieldSpec::new("firstName", "First name", FieldKind::Text),
    FieldSpec::new("lastName", "Last name", FieldKind::Text),
    FieldSpec::new("email", "Email", FieldKind::Text),
    FieldSpec::new("phone", "Phone number", FieldKind::Text),
];

const SELL_MY_CAR_STEPS: &[StepSpec] = &[
    StepSpec {
        title: "Enter vehicle details or VIN to get an offer",
        fields: &["inputMethod", "year", "make", "model", "trim", "vin"],
        rules: &[Rule::Choice("inputMethod"), Rule::Branch { selector: "inputMethod", branches: VEHICLE_IDENTITY }],
        missing: "Please identify your vehicle",
        field_missing: &[],
    },
    StepSpec {
        title: "Tell us about your vehicle",
        fields: &["odometer", "transmission", "exteriorColor", "interiorColor"],
        rules: &[Rule::Required(&["odometer"]), Rule::Choice("transmission")],
        missing: "Please enter the odometer reading and transmission",
        field_missing: &[],
    },
    StepSpec {
        title: "What condition is it in?",
        fields: &[
            "hasExteriorDamage",
            "hasInteriorDamage",
            "hasAccidents",
            "hasMechanicalIssues",
            "hasWarningLights",
            "numberOfKeys",
        ],
        rules: &[Rule::Answered(CONDITION_FLAGS), Rule::Required(&["numberOfKeys"])],
        missing: "Please answer every condition question",
        field_missing: &[],
    },
    StepSpec {
        title: "What is your name?",
        fields: &["firstName", "lastName"],
        rules: &[Rule::Required(&["firstName", "lastName"])],
        missing: "Please enter your name",
        field_missing: &[],
    },
    StepSpec {
        title: "How can we reach you?",
        fields: &["email", "phone"],
        rules: &[Rule::Required(&["email", "phone"]), Rule::Email("email")],
        missing: "Please enter your email and phone number",
        field_missing: &[],
    },
    StepSpec {
        title: "Review and submit",
        fields: &[],
        rules: &[],
        missing: "",
        field_missing: &[],
    },
];

const SELL_MY_CAR_NOTES: &[NoteEntry] = &[
    NoteEntry::Field { key: "inputMethod", field: "inputMethod" },
    NoteEntry::Group {
        key: "vehicle",
        entries: &[("year", "year"), ("make", "make"), ("model", "model"), ("trim", "trim"), ("vin", "vin")],
    },
    NoteEntry::Group {
        key: "details",
        entries: &[
            ("odometer", "odometer"),
            ("exteriorColor", "exteriorColor"),
            ("interiorColor", "interiorColor"),
            ("transmission", "transmission"),
        ],
    },
    NoteEntry::Group {
        key: "condition",
        entries: &[
            ("hasExteriorDamage", "hasExteriorDamage"),
            ("hasInteriorDamage", "hasInteriorDamage"),
            ("hasAccidents", "hasAccidents"),
            ("hasMechanicalIssues", "hasMechanicalIssues"),
            ("hasWarningLights", "hasWarningLights"),
            ("numberOfKeys", "numberOfKeys"),
        ],
    },
    NoteEntry::Constant { key: "submissionType", value: "appraisal" },
];

fn sell_my_car_summary(fields: &Fields) -> String {
    let vin = match fields.text("vin") {
        "" => "Not provided",
        vin => vin,
    };
    format!(
        "Vehicle Appraisal Request\n\nVehicle: {} {} {} {}\nVIN: {}\nOdometer: {} km",
        fields.text("year"),
        fields.text("make"),
        fields.text("model"),
        fields.text("trim"),
        vin,
        fields.text("odometer"),
    )
}

/// Trade-in appraisal request.
pub static SELL_MY_CAR: WizardDefinition = WizardDefinition {
    id: "sell_my_car",
    name: "Sell My Car",
    storage_key: "car_street_appraisal_v1",
    fields: SELL_MY_CAR_FIELDS,
    steps: SELL_MY_CAR_STEPS,
    contact: ContactFields { first_name: "firstName", last_name: "lastName", email: "email", phone: "phone" },
    notes: SELL_MY_CAR_NOTES,
    summary: sell_my_car_summary,
    submitted: Message { title: "Your appraisal request has been submitted!", detail: "" },
    submit_failed: Message { title: "Failed to submit. Please try again.", detail: "" },
    edit_shortcuts: &[1],
};

/// Looks a wizard up by its id or its command-line spelling.
pub fn by_name(name: &str) -> Option<&'static WizardDefinition> {
    match name {
        "pre_approval" | "pre-approval" => Some(&PRE_APPROVAL),
        "sell_my_car" | "sell-my-car" => Some(&SELL_MY_CAR),
        _ => None,
    }
}
