use anyhow::Result;
use shengyun_etl::adapters::script::ScriptSettings;
use shengyun_etl::config::{
    ArrangeSettings, ExamplesSettings, ExtractSettings, LocationSettings, OutputFormat,
};
use shengyun_etl::domain::model::Feature;
use shengyun_etl::{run_job, EtlError, Job, OutputSettings};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> Result<String> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path.to_string_lossy().replace('\\', "/"))
}

fn output_settings(dir: &TempDir, formats: Vec<OutputFormat>, compress: bool) -> OutputSettings {
    OutputSettings {
        output_path: dir.path().to_string_lossy().replace('\\', "/"),
        formats,
        compress,
        ..OutputSettings::default()
    }
}

fn location_settings(abbreviations: String, script: ScriptSettings) -> LocationSettings {
    LocationSettings {
        abbreviations,
        allow_duplicate_abbreviations: false,
        partitions: "全部".to_string(),
        script,
    }
}

fn arrange_settings(surveys: Vec<String>, workbook: String) -> ArrangeSettings {
    ArrangeSettings {
        surveys,
        workbook,
        sheet: "層級".to_string(),
        character_column: "單字".to_string(),
        category_column: "韻母簡".to_string(),
        feature: Feature::Vowel,
        small_class_ratio: 0.07,
        merge_groups: BTreeMap::new(),
    }
}

#[tokio::test]
async fn test_extract_job_writes_csv_and_json() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    let survey = write(
        input.path(),
        "廣州.tsv",
        "\u{feff}#漢字\t音標\t解釋\n東\ttuŋ1\t東方\n好\thou2\t\n好\thou3\t喜好\n□\tpɔk1\t\n",
    )?;

    let job = Job::Extract(ExtractSettings {
        surveys: vec![survey],
        feature: Feature::Vowel,
        characters: String::new(),
    });
    let location = run_job(
        job,
        output_settings(&output, vec![OutputFormat::Csv, OutputFormat::Json], false),
        false,
    )
    .await?;
    assert_eq!(Path::new(&location), output.path());

    let csv = std::fs::read_to_string(output.path().join("廣州.csv"))?;
    assert_eq!(csv, "漢字,音標,韻母\n東,tuŋ1,uŋ\n好,hou2,ou\n好,hou3,ou\n");

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.path().join("廣州.json"))?)?;
    assert_eq!(json["name"], "廣州");
    assert_eq!(json["rows"][1][0], "東");

    let summary: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.path().join("summary.json"))?)?;
    assert_eq!(summary["job"], "extract");
    assert_eq!(summary["details"]["feature"], "韻母");
    Ok(())
}

#[tokio::test]
async fn test_examples_job_zips_outputs() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    let examples = write(input.path(), "例字.csv", "攝,例字\n通,東冬/江\n")?;
    let guangzhou = write(
        input.path(),
        "廣州.tsv",
        "#漢字\t音標\n東\ttuŋ1\n冬\ttoŋ1\n江\tkɔŋ1\n",
    )?;
    let missing = input.path().join("缺失.tsv").to_string_lossy().to_string();

    let job = Job::Examples(ExamplesSettings {
        surveys: vec![guangzhou, missing],
        workbook: examples,
        sheet: None,
        column: "例字".to_string(),
        feature: Feature::Vowel,
    });
    let location = run_job(job, output_settings(&output, vec![OutputFormat::Tsv], true), false).await?;
    assert!(location.ends_with("shengyun_output.zip"));

    let archive = std::fs::read(output.path().join("shengyun_output.zip"))?;
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive))?;
    let mut names: Vec<String> = zip.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(names, vec!["summary.json", "例字_韻母.tsv", "例字_韻母_notes.tsv"]);

    let mut table = String::new();
    zip.by_name("例字_韻母.tsv")?.read_to_string(&mut table)?;
    // 東冬 兩字各一讀，平手取先出現者
    assert_eq!(table, "例字\t廣州\n東冬/江\tuŋ/ɔŋ\n");

    let mut notes = String::new();
    zip.by_name("例字_韻母_notes.tsv")?.read_to_string(&mut notes)?;
    assert_eq!(notes, "cell\trow\tcolumn\tnote\nB2\t2\t2\toŋ: 冬\n");
    Ok(())
}

#[tokio::test]
async fn test_arrange_job_matches_simplified_file_names() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    let abbreviations = write(
        input.path(),
        "簡稱.csv",
        "簡稱,音典分區,是否有人在做\n廣州,嶺南-廣府,是\n佛山,嶺南-廣府,\n",
    )?;
    let dictionary = write(input.path(), "TSCharacters.txt", "廣\t广\n東\t东\n")?;
    let hierarchy = write(input.path(), "層級.csv", "單字,韻母簡\n東,通-東\n冬,通-冬\n")?;
    let foshan = write(input.path(), "佛山.tsv", "#漢字\t音標\n東\ttoŋ1\n冬\ttoŋ1\n")?;
    let guangzhou = write(
        input.path(),
        "广州.tsv",
        "#漢字\t音標\n東\ttuŋ1\n冬\ttuŋ1\n冬\ttoŋ1\n",
    )?;

    let script = ScriptSettings {
        t2s: vec![dictionary],
        ..ScriptSettings::default()
    };
    let job = Job::Arrange {
        settings: arrange_settings(vec![foshan, guangzhou], hierarchy),
        locations: location_settings(abbreviations, script),
    };
    run_job(job, output_settings(&output, vec![OutputFormat::Csv], false), false).await?;

    let level1 = std::fs::read_to_string(output.path().join("韻母簡_第1級.csv"))?;
    let lines: Vec<&str> = level1.lines().collect();
    assert_eq!(lines[0], "level1,广州_聲韻,广州_轄字,佛山_聲韻,佛山_轄字");
    assert_eq!(lines[1], "通,oŋ,冬,oŋ,東冬");
    assert_eq!(lines[2], "通,uŋ,東冬,,");
    assert!(output.path().join("韻母簡_第2級.csv").exists());

    let notes = std::fs::read_to_string(output.path().join("韻母簡_第1級_notes.csv"))?;
    assert!(notes.contains("C2,2,3,\"冬：tuŋ1, toŋ1\""));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_abbreviations_need_opt_in() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    let abbreviations = write(
        input.path(),
        "簡稱.csv",
        "簡稱,音典分區,是否有人在做\n廣州,嶺南-廣府,是\n廣州,嶺南-廣府,\n",
    )?;
    let hierarchy = write(input.path(), "層級.csv", "單字,韻母簡\n東,通\n")?;
    let guangzhou = write(input.path(), "廣州.tsv", "#漢字\t音標\n東\ttuŋ1\n")?;

    let mut locations = location_settings(abbreviations, ScriptSettings::default());
    let job = Job::Arrange {
        settings: arrange_settings(vec![guangzhou.clone()], hierarchy.clone()),
        locations: locations.clone(),
    };
    let err = run_job(job, output_settings(&output, vec![OutputFormat::Csv], false), false)
        .await
        .unwrap_err();
    assert!(matches!(err, EtlError::DuplicateAbbreviationError { ref names } if names == &["廣州"]));
    assert_eq!(err.exit_code(), 2);

    locations.allow_duplicate_abbreviations = true;
    let job = Job::Arrange {
        settings: arrange_settings(vec![guangzhou], hierarchy),
        locations,
    };
    run_job(job, output_settings(&output, vec![OutputFormat::Csv], false), false).await?;
    let level1 = std::fs::read_to_string(output.path().join("韻母簡_第1級.csv"))?;
    assert_eq!(level1, "level1,廣州_聲韻,廣州_轄字\n通,uŋ,東\n");
    Ok(())
}
