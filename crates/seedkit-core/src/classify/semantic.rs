use serde::{Deserialize, Serialize};

/// A semantic classification assigned to a column, independent of its SQL type.
///
/// Column-name affinity rules (`classify::rules`) and a type-based fallback
/// produce one of these for every column the fabricator touches; `generate::providers`
/// dispatches on the variant to pick a realistic value shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    // === Identity ===
    FirstName,
    LastName,
    FullName,
    Username,
    DisplayName,
    Email,
    Phone,
    PhoneCountryCode,

    // === Address / geo ===
    StreetAddress,
    City,
    State,
    ZipCode,
    PostalCode,
    Country,
    CountryCode,
    Latitude,
    Longitude,

    // === Company / work ===
    CompanyName,
    JobTitle,
    Department,
    Industry,

    // === Web / network ===
    Url,
    DomainName,
    IpAddress,
    MacAddress,
    UserAgent,
    Slug,

    // === Content ===
    Title,
    Description,
    Bio,
    Paragraph,
    Sentence,
    HtmlContent,
    MarkdownContent,

    // === Files / media ===
    ImageUrl,
    AvatarUrl,
    ThumbnailUrl,
    FileUrl,
    FileName,
    MimeType,
    FileSize,

    // === Money ===
    Price,
    Amount,
    Currency,
    CurrencyCode,
    Percentage,

    // === Temporal ===
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    StartDate,
    EndDate,
    BirthDate,
    DateOnly,
    TimeOnly,
    Timestamp,

    // === Auth / security ===
    PasswordHash,
    Token,
    ApiKey,
    SecretKey,
    Uuid,
    AutoIncrement,
    ExternalId,

    // === Commerce identifiers ===
    Sku,
    OrderNumber,
    InvoiceNumber,
    TrackingNumber,

    // === Status / enum-like ===
    Status,
    Role,
    Priority,
    Category,
    Tag,
    BooleanFlag,
    EnumValue,

    // === Numeric ===
    Quantity,
    Rating,
    Score,
    Weight,
    Height,
    Age,
    Duration,
    SortOrder,

    // === Misc data ===
    JsonData,
    Color,
    HexColor,
    Locale,
    Timezone,

    // === Generic type-based fallback ===
    /// Calendar year with no name-based match (MySQL YEAR).
    Year,
    /// Integer-typed column with no name-based match; bounded by `Column::min_value`/`max_value`.
    GenericInteger,
    /// Float/decimal-typed column with no name-based match; bounded likewise.
    GenericFloat,
    /// Text/char-typed column with no name-based match; truncated to `max_length`.
    GenericText,
    /// Binary/varbinary-typed column with no name-based match.
    GenericBinary,

    /// Unclassified — the type-based or generic fallback.
    Unknown,
}

/// A group of semantic types that should be generated together so a row reads
/// as one coherent record instead of independently-randomized fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationGroup {
    /// Street/city/state/postal/country columns on one table.
    Address,
    /// Paired latitude/longitude columns.
    GeoCoordinates,
    /// Name/username/email columns that should agree with each other.
    PersonIdentity,
    /// created_at/updated_at/deleted_at ordering on one table.
    Temporal,
    /// start_date/end_date pairs that must satisfy start <= end.
    TemporalRange,
}

impl SemanticType {
    /// The correlation group this type participates in, if any.
    pub fn correlation_group(&self) -> Option<CorrelationGroup> {
        use SemanticType::*;
        match self {
            StreetAddress | City | State | ZipCode | PostalCode | Country | CountryCode => {
                Some(CorrelationGroup::Address)
            }
            Latitude | Longitude => Some(CorrelationGroup::GeoCoordinates),
            FirstName | LastName | FullName | Username | Email => {
                Some(CorrelationGroup::PersonIdentity)
            }
            CreatedAt | UpdatedAt | DeletedAt => Some(CorrelationGroup::Temporal),
            StartDate | EndDate => Some(CorrelationGroup::TemporalRange),
            _ => None,
        }
    }
}
