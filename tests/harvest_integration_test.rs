//! End-to-end harvest tests against canned registry responses

use annuaire::config::HarvestConfig;
use annuaire::core::harvest::{HarvestCoordinator, SkipReason};
use annuaire::fhir::{ClientSettings, FhirClient, MemoryTransport};
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = "https://registry.example/fhir/v2";
const RPPS: &str = "https://rpps.esante.gouv.fr";

fn client(transport: Arc<MemoryTransport>) -> FhirClient {
    FhirClient::new(
        transport,
        ClientSettings {
            base_url: BASE.to_string(),
            timeout: Duration::from_secs(30),
            entry_limit: Some(50),
        },
    )
}

fn search_url() -> String {
    format!(
        "{BASE}/Organization?address-postalcode=974%2C976&_count=50&_revinclude=PractitionerRole%3Aorganization"
    )
}

fn lookup_url(practitioner_id: &str) -> String {
    format!("{BASE}/Practitioner?qualification-code=70&_id={practitioner_id}&_count=50")
}

fn organization(id: &str, name: &str, address: &str) -> String {
    format!(
        r#"{{"resource": {{"resourceType": "Organization", "id": "{id}", "name": "{name}",
            "address": [{address}]}}}}"#
    )
}

fn role(id: &str, practitioner: &str, organization: &str) -> String {
    format!(
        r#"{{"resource": {{"resourceType": "PractitionerRole", "id": "{id}",
            "practitioner": {{"reference": "Practitioner/{practitioner}"}},
            "organization": {{"reference": "Organization/{organization}"}}}}}}"#
    )
}

fn page(next: Option<&str>, entries: &[String]) -> String {
    let links = next
        .map(|url| format!(r#"[{{"relation": "self", "url": "{BASE}"}}, {{"relation": "next", "url": "{url}"}}]"#))
        .unwrap_or_else(|| "[]".to_string());
    format!(
        r#"{{"resourceType": "Bundle", "type": "searchset", "link": {links}, "entry": [{}]}}"#,
        entries.join(",")
    )
}

fn practitioner(identifier: &str, family: &str, given: &str, email: &str, phone: &str) -> String {
    format!(
        r#"{{"resourceType": "Bundle", "total": 1, "entry": [{{"resource": {{
            "resourceType": "Practitioner",
            "identifier": [
                {{"system": "urn:oid:1.2.250.1.71.4.2.1", "value": "ADELI-1"}},
                {{"system": "{RPPS}", "value": "{identifier}"}}
            ],
            "name": [{{"family": "{family}", "given": {given}}}],
            "telecom": [
                {{"system": "phone", "value": "{phone}"}},
                {{"system": "email", "value": "{email}"}}
            ]}}}}]}}"#
    )
}

const EMPTY_LOOKUP: &str = r#"{"resourceType": "Bundle", "total": 0}"#;

#[tokio::test]
async fn test_mayotte_practitioner_end_to_end() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(
                search_url(),
                page(
                    None,
                    &[
                        organization(
                            "o1",
                            "Cabinet du Lagon",
                            r#"{"line": ["12 Rue X"], "city": "MAMOUDZOU", "postalCode": "97611"}"#,
                        ),
                        role("r1", "p1", "o1"),
                    ],
                ),
            )
            .with_response(
                lookup_url("p1"),
                practitioner(
                    "10001234567",
                    "DE LA TOUR",
                    r#"["jean", "MARIE"]"#,
                    "Jean.Dupont@Example.FR",
                    "02 69 61 00 00",
                ),
            ),
    );

    let coordinator = HarvestCoordinator::new(client(transport.clone()), HarvestConfig::default(), RPPS);
    let report = coordinator.execute_harvest().await.unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.identifier, "10001234567");
    assert_eq!(record.first_name, "Jean Marie");
    assert_eq!(record.last_name, "De La Tour");
    assert_eq!(record.email, "jean.dupont@example.fr");
    assert_eq!(record.phone, "0269610000");
    assert_eq!(record.organization_id, "o1");
    assert_eq!(record.organization_name, "Cabinet du Lagon");
    assert_eq!(record.address, "12 Rue X");
    assert_eq!(record.city, "MAMOUDZOU");
    assert_eq!(record.zipcode, 97611);
    assert_eq!(record.region, "Mayotte");

    assert_eq!(report.summary.pages, 1);
    assert_eq!(report.summary.records, 1);
    assert_eq!(report.summary.total_skipped(), 0);
    assert!(report.summary.is_complete());
    assert_eq!(transport.requests(), vec![search_url(), lookup_url("p1")]);
}

#[tokio::test]
async fn test_unqualified_practitioner_yields_no_record() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(
                search_url(),
                page(
                    None,
                    &[
                        organization(
                            "o1",
                            "Clinique",
                            r#"{"line": ["1 Rue Y"], "city": "97400 SAINT-DENIS", "postalCode": "97400"}"#,
                        ),
                        role("r1", "p1", "o1"),
                    ],
                ),
            )
            .with_response(lookup_url("p1"), EMPTY_LOOKUP),
    );

    let coordinator = HarvestCoordinator::new(client(transport), HarvestConfig::default(), RPPS);
    let report = coordinator.execute_harvest().await.unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.summary.roles, 1);
    assert_eq!(report.summary.skipped_for(SkipReason::NoQualification), 1);
}

#[tokio::test]
async fn test_harvest_walks_cursor_then_offset_pages() {
    let cursor_link = format!("{BASE}/_page?id=c2");
    let offset_link = format!("{BASE}?_getpages=g&_pageId=3&_bundletype=searchset");
    let reunion = r#"{"line": ["5 Rue Z"], "city": "97410 SAINT-PIERRE", "postalCode": "97410"}"#;
    let mayotte = r#"{"city": "DZAOUDZI", "postalCode": 97615}"#;

    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(
                search_url(),
                page(
                    Some(&cursor_link),
                    &[organization("o1", "A", reunion), role("r1", "p1", "o1")],
                ),
            )
            .with_response(
                cursor_link.clone(),
                page(
                    Some(&offset_link),
                    &[organization("o2", "B", mayotte), role("r2", "p2", "o2")],
                ),
            )
            .with_response(
                format!("{BASE}/?_getpages=g&_pageId=3&_bundletype=searchset"),
                // o1 lives on the first page only
                page(None, &[role("r3", "p3", "o1")]),
            )
            .with_response(
                lookup_url("p1"),
                practitioner("1", "HOARAU", r#"["paul"]"#, "p@x.re", "0262"),
            )
            .with_response(
                lookup_url("p2"),
                practitioner("2", "ATTOUMANI", r#"["fatima"]"#, "f@x.yt", "0269"),
            ),
    );

    let coordinator = HarvestCoordinator::new(client(transport.clone()), HarvestConfig::default(), RPPS);
    let report = coordinator.execute_harvest().await.unwrap();

    let regions: Vec<(&str, &str, &str)> = report
        .records
        .iter()
        .map(|r| (r.identifier.as_str(), r.city.as_str(), r.region.as_str()))
        .collect();
    assert_eq!(
        regions,
        vec![("1", "SAINT-PIERRE", "Reunion"), ("2", "DZAOUDZI", "Mayotte")]
    );
    assert_eq!(report.summary.pages, 3);
    assert_eq!(report.summary.skipped_for(SkipReason::MissingOrganization), 1);
    assert!(!transport.requests().contains(&lookup_url("p3")));
}

#[tokio::test]
async fn test_practitioner_without_registry_identifier_is_skipped() {
    let lookup = r#"{"resourceType": "Bundle", "total": 1, "entry": [{"resource": {
        "resourceType": "Practitioner",
        "identifier": [{"system": "urn:oid:1.2.250.1.71.4.2.1", "value": "ADELI-1"}],
        "name": [{"family": "X"}]}}]}"#;
    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(
                search_url(),
                page(
                    None,
                    &[
                        organization("o1", "A", r#"{"postalCode": "97600"}"#),
                        role("r1", "p1", "o1"),
                    ],
                ),
            )
            .with_response(lookup_url("p1"), lookup),
    );

    let coordinator = HarvestCoordinator::new(client(transport), HarvestConfig::default(), RPPS);
    let report = coordinator.execute_harvest().await.unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.summary.skipped_for(SkipReason::MissingIdentifier), 1);
}

#[tokio::test]
async fn test_unsupported_next_link_stops_harvest_and_keeps_records() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(
                search_url(),
                page(
                    Some(&format!("{BASE}/Organization?page=2")),
                    &[
                        organization("o1", "Cabinet M", r#"{"postalCode": "97611"}"#),
                        role("r1", "p1", "o1"),
                    ],
                ),
            )
            .with_response(
                lookup_url("p1"),
                practitioner("123", "Doe", r#"["Jane"]"#, "jane@example.org", "0269000000"),
            ),
    );

    let coordinator =
        HarvestCoordinator::new(client(transport.clone()), HarvestConfig::default(), RPPS);
    let report = coordinator.execute_harvest().await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].identifier, "123");
    assert_eq!(report.records[0].region, "Mayotte");
    assert_eq!(report.summary.pages, 1);
    assert!(report.summary.failed);

    let err = report.failure.expect("pagination failure is reported");
    assert!(err.to_string().contains("Unsupported pagination"));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_odd_organization_shape_does_not_cost_the_page() {
    let transport = Arc::new(
        MemoryTransport::new()
            .with_response(
                search_url(),
                page(
                    None,
                    &[
                        r#"{"resource": {"resourceType": "Organization", "id": "o1",
                            "name": {"text": "A"}, "address": {"city": "X"}}}"#
                            .to_string(),
                        organization("o2", "Cabinet B", r#"{"postalCode": "97400"}"#),
                        role("r1", "p1", "o1"),
                        role("r2", "p2", "o2"),
                    ],
                ),
            )
            .with_response(
                lookup_url("p1"),
                practitioner("1", "Un", r#"["Anne"]"#, "a@example.org", "0262000001"),
            )
            .with_response(
                lookup_url("p2"),
                practitioner("2", "Deux", r#"["Bea"]"#, "b@example.org", "0262000002"),
            ),
    );

    let coordinator = HarvestCoordinator::new(client(transport), HarvestConfig::default(), RPPS);
    let report = coordinator.execute_harvest().await.unwrap();

    assert!(report.failure.is_none());
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].organization_name, "");
    assert_eq!(report.records[0].zipcode, 0);
    assert_eq!(report.records[1].zipcode, 97400);
    assert_eq!(report.records[1].region, "Reunion");
}
