use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A bloom command isolated from the user's settings and environment
fn bloom(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("bloom").unwrap();
    cmd.env("HOME", home)
        .env("BLOOM_STORE", home.join("store"))
        .env("BLOOM_TEMP_DIR", home.join("tmp"))
        .env("BLOOM_BASE_URL_PATH", "https://cdn.example.com/images")
        .env_remove("BLOOM_SETTINGS")
        .env_remove("BLOOM_HEXO_PROJECT")
        .env_remove("BLOOM_HOST")
        .env_remove("BLOOM_USER")
        .env_remove("BLOOM_BASE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn read_meta(article: &Path) -> Result<toml::Table, Box<dyn std::error::Error>> {
    Ok(fs::read_to_string(article.join("meta.toml"))?.parse()?)
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn create_update_show_publish() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    let store = home.path().join("store");
    fs::create_dir_all(&store)?;

    // Create
    bloom(home.path())
        .args(["create", "Tree Traversal", "树的遍历"])
        .assert()
        .success();
    let article = store.join("树的遍历");
    assert!(article.join("meta.toml").is_file());
    assert!(article.join("img").is_dir());
    assert_eq!(read_meta(&article)?["base"]["name"].as_str(), Some("tree-traversal"));

    // Edit the document and update meta.toml from it
    fs::write(
        article.join("树的遍历.md"),
        "# 二叉树的遍历\n\nIntro text\n\n![tree](img/tree.png)\n\n```rust\nfn walk() {}\n```\n",
    )?;
    bloom(home.path())
        .args(["update", "树的遍历"])
        .assert()
        .success();
    assert_eq!(
        read_meta(&article)?["base"]["titleCn"].as_str(),
        Some("二叉树的遍历")
    );

    // Show
    let output = bloom(home.path())
        .args(["show", "树的遍历"])
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(
        stdout(&output),
        "# 二叉树的遍历\n\nIntro text\n\n![tree](img/tree.png)\n\n```rust\nfn walk() {}\n```\n"
    );

    let output = bloom(home.path())
        .args(["show", "--outline"])
        .arg(&article)
        .assert()
        .success()
        .get_output()
        .clone();
    let outline = stdout(&output);
    assert!(outline.contains("(title) 二叉树的遍历"));
    assert!(outline.contains("(image) tree"));
    assert!(outline.contains("(code block) language: rust, 1 lines"));

    // Publish to a temp file
    bloom(home.path())
        .args(["publish", "树的遍历", "--platform", "zhihu"])
        .assert()
        .success();
    let published = fs::read_to_string(home.path().join("tmp").join("树的遍历.md"))?;
    assert!(published.starts_with("Intro text\n\n"));
    assert!(published.contains("![tree](https://cdn.example.com/images/tree-traversal/tree.png)"));

    Ok(())
}

#[test]
fn list_skips_hidden_entries() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    let store = home.path().join("store");
    fs::create_dir_all(store.join("first"))?;
    fs::create_dir_all(store.join("second"))?;
    fs::create_dir_all(store.join(".git"))?;

    let output = bloom(home.path())
        .arg("list")
        .assert()
        .success()
        .get_output()
        .clone();

    assert_eq!(stdout(&output), "first\nsecond\n2 articles(collections).\n");
    Ok(())
}

#[test]
fn unknown_platform_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    fs::create_dir_all(home.path().join("store"))?;
    bloom(home.path())
        .args(["create", "Post", "文章"])
        .assert()
        .success();

    let output = bloom(home.path())
        .args(["publish", "文章", "--platform", "medium"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown platform `medium'"));
    Ok(())
}

#[test]
fn missing_article_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = tempdir()?;
    fs::create_dir_all(home.path().join("store"))?;

    bloom(home.path())
        .args(["show", "does-not-exist"])
        .assert()
        .failure()
        .code(1);
    Ok(())
}
