use crate::core::error::FxError;
use crate::core::rates::{BASE_CURRENCY, RateProvider, RateTable};
use crate::providers::util::{get_text, http_client};
use async_trait::async_trait;
use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::time::Duration;
use tracing::{debug, instrument};

const SOURCE: &str = "ECB reference rates";
const DAILY_PATH: &str = "/stats/eurofxref/eurofxref-daily.xml";

/// Daily euro foreign exchange reference rates published by the ECB.
pub struct EcbRateProvider {
    base_url: String,
    timeout: Duration,
}

impl EcbRateProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        EcbRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl RateProvider for EcbRateProvider {
    #[instrument(name = "EcbRateFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_rates(&self) -> Result<RateTable, FxError> {
        let url = format!("{}{}", self.base_url, DAILY_PATH);
        let client = http_client(self.timeout)?;
        let body = get_text(&client, &url, SOURCE).await?;

        let table = parse_reference_rates(&body)?;
        debug!(
            currencies = table.currencies().count(),
            as_of = ?table.as_of(),
            "Parsed ECB reference rates"
        );
        Ok(table)
    }
}

#[derive(Default)]
struct CubeAttributes {
    currency: Option<String>,
    rate: Option<String>,
    time: Option<String>,
}

fn read_cube(element: &BytesStart) -> Result<CubeAttributes, FxError> {
    let mut cube = CubeAttributes::default();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| FxError::parse(SOURCE, e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| FxError::parse(SOURCE, e))?
            .trim()
            .to_string();
        match attr.key.local_name().as_ref() {
            b"currency" => cube.currency = Some(value),
            b"rate" => cube.rate = Some(value),
            b"time" => cube.time = Some(value),
            _ => {}
        }
    }
    Ok(cube)
}

/// Parses the ECB `eurofxref` document into a table based on EUR.
///
/// Any `Cube` entry whose rate is missing, unparseable, repeated or not
/// positive fails the whole document; so does a document without a single rate.
pub fn parse_reference_rates(xml: &str) -> Result<RateTable, FxError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut as_of = None;
    let mut entries: Vec<(String, f64)> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                if element.local_name().as_ref() != b"Cube" {
                    continue;
                }
                let cube = read_cube(&element)?;

                if let Some(time) = cube.time {
                    let date = NaiveDate::parse_from_str(&time, "%Y-%m-%d").map_err(|e| {
                        FxError::parse(SOURCE, format!("invalid reference date '{time}': {e}"))
                    })?;
                    as_of = Some(date);
                }

                match (cube.currency, cube.rate) {
                    (Some(currency), Some(rate)) => {
                        let value = rate.parse::<f64>().map_err(|e| {
                            FxError::parse(SOURCE, format!("invalid rate '{rate}' for {currency}: {e}"))
                        })?;
                        if entries.iter().any(|(code, _)| code.eq_ignore_ascii_case(&currency)) {
                            return Err(FxError::parse(
                                SOURCE,
                                format!("duplicate rate for {currency}"),
                            ));
                        }
                        entries.push((currency, value));
                    }
                    (Some(currency), None) => {
                        return Err(FxError::parse(
                            SOURCE,
                            format!("missing rate for {currency}"),
                        ));
                    }
                    (None, Some(rate)) => {
                        return Err(FxError::parse(
                            SOURCE,
                            format!("rate '{rate}' without currency"),
                        ));
                    }
                    (None, None) => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FxError::parse(
                    SOURCE,
                    format!("malformed XML at position {}: {e}", reader.buffer_position()),
                ));
            }
            _ => {}
        }
    }

    if entries.is_empty() {
        return Err(FxError::parse(SOURCE, "no exchange rates found"));
    }

    let mut table = RateTable::new(BASE_CURRENCY, as_of);
    for (currency, rate) in entries {
        table
            .insert(&currency, rate)
            .map_err(|e| FxError::parse(SOURCE, e))?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gesmes:Envelope xmlns:gesmes="http://www.gesmes.org/xml/2002-08-01" xmlns="http://www.ecb.int/vocabulary/2002-08-01/eurofxref">
	<gesmes:subject>Reference rates</gesmes:subject>
	<gesmes:Sender>
		<gesmes:name>European Central Bank</gesmes:name>
	</gesmes:Sender>
	<Cube>
		<Cube time='2024-05-17'>
			<Cube currency='USD' rate='1.0866'/>
			<Cube currency='JPY' rate='169.21'/>
			<Cube currency='GBP' rate='0.85633'/>
			<Cube currency='CHF' rate='0.9874'/>
		</Cube>
	</Cube>
</gesmes:Envelope>"#;

    async fn create_mock_server(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DAILY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[test]
    fn test_parse_reference_rates() {
        let table = parse_reference_rates(SAMPLE_XML).unwrap();
        assert_eq!(table.base(), "EUR");
        assert_eq!(table.get("EUR"), Some(1.0));
        assert_eq!(table.get("USD"), Some(1.0866));
        assert_eq!(table.get("JPY"), Some(169.21));
        assert_eq!(table.get("GBP"), Some(0.85633));
        assert_eq!(table.currencies().count(), 5);
        assert_eq!(table.as_of(), NaiveDate::from_ymd_opt(2024, 5, 17));
    }

    #[test]
    fn test_parse_rejects_partial_document() {
        let xml = r#"<Envelope><Cube><Cube time="2024-05-17">
            <Cube currency="USD" rate="1.0866"/>
            <Cube currency="JPY" rate="n/a"/>
        </Cube></Cube></Envelope>"#;
        let err = parse_reference_rates(xml).unwrap_err();
        assert!(matches!(err, FxError::Parse { .. }));
        assert!(err.to_string().contains("invalid rate 'n/a' for JPY"), "{err}");
    }

    #[test]
    fn test_parse_rejects_zero_rate() {
        let xml = r#"<Cube><Cube currency="USD" rate="0.0"/></Cube>"#;
        let err = parse_reference_rates(xml).unwrap_err();
        assert!(matches!(err, FxError::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_duplicate_currency() {
        let xml = r#"<Cube><Cube time="2024-05-17">
            <Cube currency="USD" rate="1.0866"/>
            <Cube currency="usd" rate="1.2"/>
        </Cube></Cube>"#;
        let err = parse_reference_rates(xml).unwrap_err();
        assert!(matches!(err, FxError::Parse { .. }));
        assert!(err.to_string().contains("duplicate rate for usd"), "{err}");
    }

    #[test]
    fn test_parse_rejects_missing_rate_attribute() {
        let xml = r#"<Cube><Cube currency="USD"/></Cube>"#;
        let err = parse_reference_rates(xml).unwrap_err();
        assert!(err.to_string().contains("missing rate for USD"), "{err}");
    }

    #[test]
    fn test_parse_rejects_unexpected_layout() {
        let xml = r#"<rates><rate code="USD" value="1.08"/></rates>"#;
        let err = parse_reference_rates(xml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse ECB reference rates: no exchange rates found"
        );

        let err = parse_reference_rates("<Cube><Cube currency='USD' rate='1.0'></Envelope>")
            .unwrap_err();
        assert!(matches!(err, FxError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let mock_server = create_mock_server(SAMPLE_XML, 200).await;
        let provider = EcbRateProvider::new(&mock_server.uri(), Duration::from_secs(2));

        let table = provider.fetch_rates().await.unwrap();
        assert_eq!(table.get("EUR"), Some(1.0));
        assert_eq!(table.get("CHF"), Some(0.9874));
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_failure() {
        let mock_server = create_mock_server("", 500).await;
        let provider = EcbRateProvider::new(&mock_server.uri(), Duration::from_secs(2));

        let err = provider.fetch_rates().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch ECB reference rates: HTTP error: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DAILY_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SAMPLE_XML)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;
        let provider = EcbRateProvider::new(&mock_server.uri(), Duration::from_millis(50));

        let err = provider.fetch_rates().await.unwrap_err();
        assert!(matches!(err, FxError::Fetch { .. }));
    }
}
