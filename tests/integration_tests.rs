use anyhow::Result;
use httpmock::prelude::*;
use statscraper::config::toml_config::ImfConfig;
use statscraper::{
    BoeRequest, BoeSource, DuplicatePolicy, EtlEngine, HttpFetcher, ImfRequest, ImfSource,
    LocalStorage, NumericCell, OnsRequest, OnsSource, OutputFormat, ScrapeError, SourceIo,
    TableReader,
};
use std::io::{Cursor, Write};
use tempfile::TempDir;

const QNA_CSV: &str = "\
,YBHA,ABMI
Title,Gross Domestic Product: at current prices,Gross Domestic Product: chained volume measures
CDID,YBHA,ABMI
PreUnit,£,£
Unit,m,m
2002,\"1,100,000\",\"1,300,000\"
2003,\"1,150,000\",\"1,340,000\"
2002 Q2,\"275,000\",\"325,000\"
2002 Q3,\"276,500\",\"327,000\"
2002 Q4,\"280,100\",\"330,000\"
2003 Q1,\"281,000\",\"331,000\"
";

const WEO_TSV: &str = "WEO Country Code\tISO\tWEO Subject Code\tCountry\tSubject Descriptor\t2010\t2011\tEstimates Start After
112\tGBR\tNGDP_RPCH\tUnited Kingdom\tGross domestic product, constant prices\t1.9\t1.1\t2012
112\tGBR\tGGX_NGDP\tUnited Kingdom\tGeneral government total expenditure\t47.3\tn/a\t2012
132\tFRA\tNGDP_RPCH\tFrance\tGross domestic product, constant prices\t1.7\t2.0\t2012
";

type HttpIo = SourceIo<HttpFetcher, TableReader, LocalStorage>;

fn http_io(output_path: &str, format: OutputFormat) -> Result<HttpIo> {
    let na_values = ImfConfig::default().na_values;
    Ok(SourceIo::new(
        HttpFetcher::new(10, "statscraper-test")?,
        TableReader::new(na_values),
        LocalStorage::new(output_path.to_string()),
        output_path.to_string(),
        format,
    ))
}

#[tokio::test]
async fn test_ons_quarterly_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let ons_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/generator")
            .query_param("dataset", "qna")
            .query_param("cdid", "YBHA,ABMI");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(QNA_CSV);
    });

    let request = OnsRequest::new("qna", &["ybha", "abmi"], "Q")?;
    let source = OnsSource::new(
        http_io(&output_path, OutputFormat::Csv)?,
        server.url("/generator"),
        request,
    );
    let engine = EtlEngine::new(source);
    let written = engine.run().await?;

    ons_mock.assert();
    let written = written.expect("quarterly rows are present");
    assert!(written.ends_with("ons_qna_q.csv"));

    let content = std::fs::read_to_string(temp_dir.path().join("ons_qna_q.csv"))?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "date,YBHA,ABMI");
    assert_eq!(lines[1], "2002-06-30,275000,325000");
    assert_eq!(lines[4], "2003-03-31,281000,331000");
    assert_eq!(lines.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_ons_annual_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/generator");
        then.status(200).body(QNA_CSV);
    });

    let request = OnsRequest::new("qna", &["ABMI"], "a")?;
    let source = OnsSource::new(
        http_io(&output_path, OutputFormat::Json)?,
        server.url("/generator"),
        request,
    );
    EtlEngine::new(source).run().await?;

    let content = std::fs::read(temp_dir.path().join("ons_qna_a.json"))?;
    let json: serde_json::Value = serde_json::from_slice(&content)?;
    assert_eq!(json["index"], serde_json::json!(["2002-12-31", "2003-12-31"]));
    assert_eq!(json["columns"][0]["code"], "ABMI");
    assert_eq!(
        json["columns"][0]["values"],
        serde_json::json!([1300000.0, 1340000.0])
    );
    Ok(())
}

#[tokio::test]
async fn test_ons_missing_frequency_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/generator");
        then.status(200).body(QNA_CSV);
    });

    let request = OnsRequest::new("qna", &["YBHA"], "M")?;
    let source = OnsSource::new(
        http_io(&output_path, OutputFormat::Csv)?,
        server.url("/generator"),
        request,
    );
    let result = EtlEngine::new(source).run().await?;

    assert!(result.is_none());
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_ons_http_error_is_transport_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/generator");
        then.status(404).body("not found");
    });

    let request = OnsRequest::new("nope", &["YBHA"], "Q")?;
    let source = OnsSource::new(
        http_io(&output_path, OutputFormat::Csv)?,
        server.url("/generator"),
        request,
    );
    let result = EtlEngine::new(source).run().await;

    assert!(matches!(result, Err(ScrapeError::TransportError { .. })));
    Ok(())
}

#[tokio::test]
async fn test_boe_dated_series() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let boe_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/iadb/fromshowcolumns.asp")
            .query_param("Datefrom", "01/Aug/2007")
            .query_param("SeriesCodes", "LPMAUZI")
            .query_param("VPD", "Y");
        then.status(200)
            .body("DATE,LPMAUZI\n31 Aug 2007,\"1,201.5\"\n30 Sep 2007,1210\n");
    });

    let date_from = chrono::NaiveDate::from_ymd_opt(2007, 8, 1);
    let request = BoeRequest::new(&["LPMAUZI"], date_from, 5, true)?;
    let source = BoeSource::new(
        http_io(&output_path, OutputFormat::Csv)?,
        server.url("/iadb/fromshowcolumns.asp"),
        request,
    );
    let written = EtlEngine::new(source).run().await?;

    boe_mock.assert();
    assert!(written.is_some());
    let content = std::fs::read_to_string(temp_dir.path().join("boe_lpmauzi.csv"))?;
    assert_eq!(
        content,
        "date,LPMAUZI\n2007-08-31,1201.5\n2007-09-30,1210\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_imf_weo_selection() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/weo.xls");
        then.status(200).body(WEO_TSV);
    });

    let config = ImfConfig {
        weo_url: server.url("/weo.xls"),
        ..ImfConfig::default()
    };
    let request = ImfRequest::new("weo", None, Some(vec!["United Kingdom".to_string()]))?;
    let source = ImfSource::new(
        http_io(&output_path, OutputFormat::Csv)?,
        config,
        DuplicatePolicy::Reject,
        request,
    );

    let panel = source.fetch().await?;
    assert_eq!(panel.entities().len(), 1);
    assert_eq!(panel.variables().len(), 2);
    assert_eq!(
        panel.get("GGX_NGDP", "United Kingdom", 2010),
        Some(&NumericCell::Numeric(47.3))
    );
    assert_eq!(panel.get("GGX_NGDP", "United Kingdom", 2011), None);

    EtlEngine::new(source).run().await?;
    let content = std::fs::read_to_string(temp_dir.path().join("imf_weo.csv"))?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "variable,entity,year,value");
    assert_eq!(lines[1], "GGX_NGDP,United Kingdom,2010,47.3");
    assert_eq!(lines.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_imf_unknown_dataset() {
    let result = ImfRequest::new("ifs", None, None);
    assert!(matches!(result, Err(ScrapeError::UnknownDataset { .. })));
}

fn pubfin_archive(member: &str, body: &[u8]) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(member, zip::write::SimpleFileOptions::default())?;
    zip.write_all(body)?;
    Ok(zip.finish()?.into_inner())
}

#[tokio::test]
async fn test_imf_pubfin_duplicate_policy() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let archive = pubfin_archive(
        "pubfin.csv",
        b"country,year,rev\nItaly,1950,20\nItaly,1950,21\nSpain,1950,15\n",
    )?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pubfin.zip");
        then.status(200).body(archive);
    });

    let config = ImfConfig {
        pubfin_url: server.url("/pubfin.zip"),
        pubfin_member: "pubfin.csv".to_string(),
        ..ImfConfig::default()
    };

    let strict = ImfSource::new(
        http_io(&output_path, OutputFormat::Json)?,
        config.clone(),
        DuplicatePolicy::Reject,
        ImfRequest::new("pubfin", None, None)?,
    );
    assert!(matches!(
        strict.fetch().await,
        Err(ScrapeError::DuplicateKey { period: 1950, .. })
    ));

    let lenient = ImfSource::new(
        http_io(&output_path, OutputFormat::Json)?,
        config,
        DuplicatePolicy::KeepLast,
        ImfRequest::new("pubfin", None, None)?,
    );
    EtlEngine::new(lenient).run().await?;

    let content = std::fs::read(temp_dir.path().join("imf_pubfin.json"))?;
    let records: serde_json::Value = serde_json::from_slice(&content)?;
    assert_eq!(
        records,
        serde_json::json!([
            {"variable": "rev", "entity": "Italy", "year": 1950, "value": 21.0},
            {"variable": "rev", "entity": "Spain", "year": 1950, "value": 15.0}
        ])
    );
    Ok(())
}
