//! Integration tests for the audit report pipeline.
//!
//! These tests exercise the full path from JSON results to a PDF on disk.
//! They verify:
//! - Sections, subsections and files are drawn once, in input order
//! - Quiet subsections produce nothing
//! - Locale resolution against real catalog files
//! - A misconfigured section tag fails before anything is written
//! - PDF output is structurally valid

use std::fs;

use audit_pdf::layout::Document;
use audit_pdf::*;
use chrono::NaiveDate;

// ─── Helpers ────────────────────────────────────────────────────

fn fixed_time() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 5, 12)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn layout_with(json: &str, config: &ReportConfig, translator: &dyn Translator, locale: &str) -> Document {
    let tree = parse_result_tree(json).unwrap();
    let sections = SectionRegistry::with_defaults();
    ReportAssembler::new(config, translator, &sections)
        .with_timestamp(fixed_time())
        .render(&tree, locale)
        .unwrap()
}

fn layout(json: &str) -> Document {
    layout_with(json, &ReportConfig::default(), &NoTranslation, "en_US")
}

/// Texts of the body, without the header and footer of each page.
fn body_texts(doc: &Document) -> Vec<&str> {
    doc.texts()
        .filter(|t| *t != "Audit Report" && !t.starts_with("Created on : "))
        .collect()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

const ONE_ERROR: &str = r#"{
  "php": {
    "Code Quality": {
      "helpers": {
        "hasErrors": true,
        "errors": {
          "useOfObjectManager": {
            "title": "Direct use of the object manager",
            "explanation": "Inject   dependencies\n through the constructor instead.",
            "files": ["app/code/A.php", "app/code/B.php", "app/code/C.php"]
          }
        },
        "warnings": [],
        "suggestions": []
      }
    }
  }
}"#;

// ─── Rendering Tests ────────────────────────────────────────────

#[test]
fn test_single_error_entry() {
    let doc = layout(ONE_ERROR);
    assert!(doc.pages.len() >= 2, "cover page plus the section page");

    let body = body_texts(&doc);
    assert_eq!(body.iter().filter(|t| **t == "CODE QUALITY").count(), 1);
    assert_eq!(body.iter().filter(|t| **t == "HELPERS").count(), 1);
    assert_eq!(body.iter().filter(|t| **t == "Files:").count(), 1);

    let files: Vec<&str> = body.iter().copied().filter(|t| t.starts_with("-app/")).collect();
    assert_eq!(files, vec!["-app/code/A.php", "-app/code/B.php", "-app/code/C.php"]);

    assert!(body.contains(&"Inject dependencies through the constructor instead."));
}

#[test]
fn test_section_starts_on_its_own_page() {
    let doc = layout(ONE_ERROR);
    let section_page = doc
        .pages
        .iter()
        .position(|p| p.texts().any(|t| t == "CODE QUALITY"))
        .unwrap();
    assert_eq!(section_page, 1);
    assert!(!doc.pages[0].texts().any(|t| t == "Files:"));
}

#[test]
fn test_empty_lists_with_errors_flag() {
    let json = r#"{"php": {"Security": {"acl": {"hasErrors": true, "errors": [], "warnings": [], "suggestions": []}}}}"#;
    let config = ReportConfig {
        cover_page: false,
        ..Default::default()
    };
    let doc = layout_with(json, &config, &NoTranslation, "en_US");
    assert_eq!(doc.pages.len(), 1);
    assert_eq!(body_texts(&doc), vec!["SECURITY", "ACL"]);
}

#[test]
fn test_quiet_subsections_produce_nothing() {
    let json = r#"{"php": {"Security": {"acl": {"hasErrors": false,
        "errors": {"e": {"title": "hidden", "files": ["x.php"]}}}}}}"#;
    let config = ReportConfig {
        cover_page: false,
        ..Default::default()
    };
    let doc = layout_with(json, &config, &NoTranslation, "en_US");
    assert!(doc.pages.is_empty());
}

#[test]
fn test_loose_flags_and_scalar_subsections() {
    let json = r#"{"php": {"Security": {"meta": "done", "acl": {"hasErrors": 1,
        "errors": {"e": {"title": "Open ACL", "files": ["etc/acl.xml"]}}}}}}"#;
    let config = ReportConfig {
        cover_page: false,
        ..Default::default()
    };
    let doc = layout_with(json, &config, &NoTranslation, "en_US");
    let body = body_texts(&doc);
    assert!(body.contains(&"ACL"));
    assert!(body.contains(&"-etc/acl.xml"));
    assert!(!body.contains(&"META"));
}

#[test]
fn test_every_page_has_header_and_footer() {
    let doc = layout(ONE_ERROR);
    for page in &doc.pages {
        let texts: Vec<&str> = page.texts().collect();
        assert!(texts.contains(&"Audit Report"));
        assert!(texts.contains(&"Created on : 2026-05-12 09:30:00"));
    }
}

#[test]
fn test_long_file_lists_flow_over_pages() {
    let files: Vec<String> = (0..200).map(|i| format!("\"src/File{}.php\"", i)).collect();
    let json = format!(
        r#"{{"php": {{"s": {{"sub": {{"hasErrors": true, "errors": {{"e": {{"files": [{}]}}}}}}}}}}}}"#,
        files.join(",")
    );
    let doc = layout(&json);
    assert!(doc.pages.len() >= 4);

    let drawn: Vec<&str> = body_texts(&doc)
        .into_iter()
        .filter(|t| t.starts_with("-src/"))
        .collect();
    assert_eq!(drawn.len(), 200);
    assert_eq!(drawn[0], "-src/File0.php");
    assert_eq!(drawn[199], "-src/File199.php");
}

#[test]
fn test_specific_section_renderers() {
    let json = r#"{"magento": {"Modules": {"vendor": {"hasErrors": true,
        "warnings": {"ratio": {"specificSections": "manageBlockVMRatio",
            "title": "Block / view model ratio", "files": {"Vendor_A": 0.8, "Vendor_B": 0.1}}},
        "suggestions": {"list": {"specificSections": "manageSpecificModules",
            "title": "Modules to review", "files": ["Vendor_A", "Vendor_C"]}}}}}}"#;
    let doc = layout(json);
    let body = body_texts(&doc);
    assert!(body.contains(&"-Vendor_A : 80%"));
    assert!(body.contains(&"-Vendor_B : 10%"));
    assert!(body.contains(&"Vendor_A, Vendor_C"));
}

// ─── Locale Tests ───────────────────────────────────────────────

fn catalog_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("en_US.csv"), "\"Files:\",\"Affected files:\"\n").unwrap();
    fs::write(dir.path().join("fr_FR.csv"), "\"Files:\",\"Fichiers :\"\n").unwrap();
    dir
}

#[test]
fn test_unknown_locale_falls_back_to_english() {
    let dir = catalog_dir();
    let catalog = Catalog::from_dir(dir.path()).unwrap();
    let config = ReportConfig {
        cover_page: false,
        ..Default::default()
    };
    let doc = layout_with(ONE_ERROR, &config, &catalog, "de_DE");
    let body = body_texts(&doc);
    assert!(body.contains(&"Affected files:"));
    assert!(!body.contains(&"Fichiers :"));
}

#[test]
fn test_language_fallback_picks_french() {
    let dir = catalog_dir();
    let catalog = Catalog::from_dir(dir.path()).unwrap();
    let doc = layout_with(ONE_ERROR, &ReportConfig::default(), &catalog, "fr_CA");
    assert!(body_texts(&doc).contains(&"Fichiers :"));
}

// ─── End-to-end Tests ───────────────────────────────────────────

#[test]
fn test_generate_writes_valid_pdf() {
    let out = tempfile::tempdir().unwrap();
    let tree = parse_result_tree(ONE_ERROR).unwrap();
    let config = ReportConfig {
        output_name: "shop.pdf".to_string(),
        ..Default::default()
    };
    let path = generate(&tree, "en_US", &config, &DirectorySink::new(out.path())).unwrap();
    assert_eq!(path, out.path().join("shop.pdf"));

    let bytes = fs::read(&path).unwrap();
    assert_valid_pdf(&bytes);
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Count 2"));
    assert_eq!(text.matches("/BaseFont /Times-Roman").count(), 1);
    assert!(!text.contains("/Times-Bold"));
    assert!(text.contains("/Title (Audit Report)"));
}

#[test]
fn test_generate_with_translations_from_config() {
    let dir = catalog_dir();
    let config = ReportConfig {
        translations: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let bytes = render_json(ONE_ERROR, "fr_FR", &config).unwrap();
    assert_valid_pdf(&bytes);

    let missing = ReportConfig {
        translations: Some(dir.path().join("nope")),
        ..Default::default()
    };
    let err = render_json(ONE_ERROR, "fr_FR", &missing).unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }));
}

#[test]
fn test_unknown_section_tag_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let sink_dir = out.path().join("reports");
    let json = r#"{"php": {"s": {"sub": {"hasErrors": true,
        "errors": {"first": {"title": "drawn before the bad one", "files": ["a.php"]}},
        "suggestions": {"mystery": {"specificSections": "manageMystery", "title": "?"}}}}}}"#;
    let tree = parse_result_tree(json).unwrap();

    let err = generate(&tree, "en_US", &ReportConfig::default(), &DirectorySink::new(&sink_dir))
        .unwrap_err();
    match err {
        ReportError::UnknownSection { tag, entry } => {
            assert_eq!(tag, "manageMystery");
            assert_eq!(entry, "mystery");
        }
        other => panic!("expected UnknownSection, got {other:?}"),
    }
    assert!(!sink_dir.exists(), "no output may be written on failure");
}

#[test]
fn test_malformed_input_is_a_parse_error() {
    let err = render_json(r#"{"php": {"s": "#, "en_US", &ReportConfig::default()).unwrap_err();
    assert!(matches!(err, ReportError::Parse { .. }));
}

#[test]
fn test_missing_logo_degrades_gracefully() {
    let config = ReportConfig {
        logo: Some("/definitely/not/here.png".to_string()),
        ..Default::default()
    };
    let bytes = render_json(ONE_ERROR, "en_US", &config).unwrap();
    assert_valid_pdf(&bytes);
    assert!(!bytes.windows(15).any(|w| w == b"/Subtype /Image"));
}
