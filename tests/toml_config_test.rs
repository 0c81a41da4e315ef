use anyhow::Result;
use shengyun_etl::config::Job;
use shengyun_etl::domain::ports::ConfigProvider;
use shengyun_etl::utils::validation::Validate;
use shengyun_etl::{run_job, TomlConfig};
use std::path::Path;
use tempfile::TempDir;

fn slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn write_inputs(dir: &Path) -> Result<()> {
    std::fs::write(
        dir.join("統計.csv"),
        "攝,廣州_聲韻,廣州_轄字,梧州_聲韻,梧州_轄字\n通,uŋ,東冬,ʊŋ,東\n江,ɔŋ,江,ɔŋ,江 講\n",
    )?;
    std::fs::write(dir.join("順序.csv"), "送氣\nɔŋ\nuŋ\n")?;
    std::fs::write(
        dir.join("簡稱.csv"),
        "簡稱,音典分區\n廣州,嶺南-廣府\n梧州,嶺西\n",
    )?;
    Ok(())
}

fn frequency_config(data_var: &str, output: &Path, compress: bool) -> String {
    format!(
        r#"
[job]
kind = "frequency"
description = "兩廣聲韻頻率"

[load]
output_path = "{output}"
output_formats = ["tsv"]

[load.compression]
enabled = {compress}

[locations]
abbreviations = "${{{data_var}}}/簡稱.csv"

[frequency]
statistics = "${{{data_var}}}/統計.csv"
order_workbook = "${{{data_var}}}/順序.csv"

[monitoring]
enabled = false
"#,
        output = slash(output),
        compress = compress,
        data_var = data_var,
    )
}

#[test]
fn test_frequency_job_from_toml() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_inputs(input.path())?;
    std::env::set_var("SHENGYUN_IT_PLAIN", slash(input.path()));

    let config_path = input.path().join("shengyun.toml");
    std::fs::write(&config_path, frequency_config("SHENGYUN_IT_PLAIN", output.path(), false))?;

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;
    assert!(!config.compress());
    assert!(!config.monitoring_enabled());

    let job = config.to_job()?;
    assert_eq!(job.name(), "frequency");
    if let Job::Frequency { settings, .. } = &job {
        assert_eq!(settings.statistics, format!("{}/統計.csv", slash(input.path())));
        assert_eq!(settings.order_column, "送氣");
    }

    tokio_test::block_on(run_job(job, config.output_settings(), config.monitoring_enabled()))?;

    let table = std::fs::read_to_string(output.path().join("聲韻頻率.tsv"))?;
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[1], "聲韻\t廣州\t_\t梧州\t總頻率");
    assert_eq!(lines[2], "ɔŋ\t33.3%\t\t66.7%\t50.0%");
    assert_eq!(lines[3], "uŋ\t66.7%\t\t\t33.3%");
    assert_eq!(lines[4], "ʊŋ\t\t\t33.3%\t16.7%");

    let notes = std::fs::read_to_string(output.path().join("聲韻頻率_notes.tsv"))?;
    assert!(notes.contains("D3\t3\t4\t江講"));
    assert!(output.path().join("summary.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_compressed_toml_job() -> Result<()> {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_inputs(input.path())?;
    std::env::set_var("SHENGYUN_IT_ZIP", slash(input.path()));

    let config = TomlConfig::from_toml_str(&frequency_config("SHENGYUN_IT_ZIP", output.path(), true))?;
    assert_eq!(config.archive_name(), "shengyun_output.zip");

    let location = run_job(config.to_job()?, config.output_settings(), false).await?;
    assert_eq!(location, format!("{}/shengyun_output.zip", slash(output.path())));

    let archive = std::fs::read(output.path().join("shengyun_output.zip"))?;
    let zip = zip::ZipArchive::new(std::io::Cursor::new(archive))?;
    assert_eq!(zip.len(), 3);
    Ok(())
}

#[test]
fn test_invalid_job_section_rejected() -> Result<()> {
    let config = TomlConfig::from_toml_str(
        r#"
[job]
kind = "arrange"

[load]
output_path = "./output"
output_formats = ["csv"]

[arrange]
surveys = ["廣州.xlsx"]
workbook = "聲韻.xlsx"

[locations]
abbreviations = "簡稱.csv"
"#,
    )?;
    assert!(config.validate().is_err());
    Ok(())
}
