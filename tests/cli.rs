//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use assert_cmd::Command;
    use std::fs;
    use tempfile::TempDir;

    fn wordwise() -> Command {
        let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
        cmd.env_remove("WORDWISE_CONFIG")
            .env_remove("WORDWISE_VIEWPORT_HEIGHT")
            .env_remove("WORDWISE_LINE_HEIGHT")
            .env_remove("WORDWISE_CHARS_PER_LINE");
        cmd
    }

    #[test]
    fn env_docs() {
        let out = wordwise().arg("env-docs").output().unwrap();
        let stdout = String::from_utf8_lossy(&out.stdout);

        assert!(out.status.success());
        assert!(stdout.starts_with("# Environment Variables Documentation"));
        assert!(stdout.contains("WORDWISE_RATE_LIMIT_MS"));
        assert!(stdout.contains("WORDWISE_CEFR"));
    }

    #[test]
    fn scan_json_lines() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.html");
        fs::write(
            &page,
            "<html><body><h1>标题</h1><div><p>第一段</p></div><p>第二段</p></body></html>",
        )
        .unwrap();

        let out = wordwise()
            .env("WORDWISE_VIEWPORT_HEIGHT", "48")
            .arg("scan")
            .arg("--json")
            .arg(&page)
            .output()
            .unwrap();
        let stdout = String::from_utf8_lossy(&out.stdout);
        let lines: Vec<serde_json::Value> = stdout
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert!(out.status.success());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["visible"][0]["tag"], "h1");
        assert_eq!(lines[0]["visible"][1]["text"], "第一段");
        assert_eq!(lines[1]["scroll_top"], 48);
        assert_eq!(lines[1]["visible"][0]["text"], "第二段");
    }

    #[test]
    fn scan_plain_text() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<p>你好</p>").unwrap();

        let out = wordwise().arg("scan").arg(&page).output().unwrap();

        assert!(out.status.success());
        assert_eq!(
            String::from_utf8_lossy(&out.stdout),
            "# step 0 (scroll_top = 0)\n<p> 你好\n"
        );
    }

    #[test]
    fn config_init_writes_example() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wordwise.toml");

        let out = wordwise().args(["config", "init"]).arg(&path).output().unwrap();
        assert!(out.status.success());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[USER_CONFIG_KEY]"));
        assert!(written.contains("CEFR = \"A1\""));
        assert!(written.contains("modelCompany = \"OpenAI\""));
    }

    #[test]
    fn config_show_redacts_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wordwise.toml");
        fs::write(
            &path,
            "[USER_CONFIG_KEY]\nCEFR = \"C1\"\nmodelCompany = \"OpenAI\"\nmodel = \"gpt-4o\"\napiKey = \"sk-secret\"\n",
        )
        .unwrap();

        let out = wordwise()
            .env_remove("WORDWISE_API_KEY")
            .env_remove("WORDWISE_CEFR")
            .args(["config", "show", "--config"])
            .arg(&path)
            .output()
            .unwrap();
        let stdout = String::from_utf8_lossy(&out.stdout);

        assert!(out.status.success());
        assert!(stdout.contains("CEFR = \"C1\""));
        assert!(!stdout.contains("sk-secret"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use assert_cmd::Command;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn config_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wordwise.toml");
        fs::write(&path, "keep me").unwrap();

        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args(["config", "init"])
            .arg(&path)
            .output()
            .unwrap();

        assert!(!out.status.success());
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn scan_missing_file() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args(["scan", "/definitely/not/here.html"])
            .output()
            .unwrap();

        assert!(!out.status.success());
        assert!(out.stdout.is_empty());
    }

    #[test]
    fn unknown_annotation_mode() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args(["annotate", "page.html", "--mode", "poetry"])
            .output()
            .unwrap();

        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stderr).contains("poetry"));
    }
}
