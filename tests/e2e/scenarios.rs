use super::harness::{TestContext, TestEnv, ensure_dir, write_file};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "help_output",
            run: scenario_help,
        },
        Scenario {
            name: "no_args_error",
            run: scenario_no_args,
        },
        Scenario {
            name: "parse_text",
            run: scenario_parse_text,
        },
        Scenario {
            name: "parse_json",
            run: scenario_parse_json,
        },
        Scenario {
            name: "parse_finds_nearest_lockfile",
            run: scenario_parse_nearest,
        },
        Scenario {
            name: "parse_no_lockfile",
            run: scenario_parse_no_lockfile,
        },
        Scenario {
            name: "parse_malformed",
            run: scenario_parse_malformed,
        },
        Scenario {
            name: "find_gem",
            run: scenario_find,
        },
        Scenario {
            name: "find_gem_json",
            run: scenario_find_json,
        },
        Scenario {
            name: "find_missing_gem",
            run: scenario_find_missing,
        },
        Scenario {
            name: "deps_list",
            run: scenario_deps,
        },
        Scenario {
            name: "uses_list",
            run: scenario_uses,
        },
        Scenario {
            name: "uses_none",
            run: scenario_uses_none,
        },
        Scenario {
            name: "check_mixed_files",
            run: scenario_check_mixed,
        },
        Scenario {
            name: "check_json",
            run: scenario_check_json,
        },
        Scenario {
            name: "check_config_watch",
            run: scenario_check_config_watch,
        },
        Scenario {
            name: "config_flag_overrides_location",
            run: scenario_config_flag,
        },
        Scenario {
            name: "invalid_config",
            run: scenario_invalid_config,
        },
        Scenario {
            name: "verbose_logs_to_stderr",
            run: scenario_verbose,
        },
    ]
}

/// Write the Rails fixture to `<root>/Gemfile.lock` and return its path as a string.
fn rails_lockfile(ctx: &TestContext, env: &TestEnv) -> Result<String, String> {
    let path = env.root.join("Gemfile.lock");
    ctx.install_fixture("Rails.Gemfile.lock", &path)?;
    Ok(path.display().to_string())
}

fn scenario_help(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("help")?;
    let output = ctx.run_gemlock(&env, &["--help"], &env.root)?;
    output.assert_success()?;
    output.assert_stdout_contains("parse")?;
    output.assert_stdout_contains("check")?;
    Ok(())
}

fn scenario_no_args(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("no-args")?;
    let output = ctx.run_gemlock(&env, &[], &env.root)?;
    output.assert_failure()?;
    output.assert_stderr_contains("No command specified")?;
    Ok(())
}

fn scenario_parse_text(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("parse-text")?;
    let path = env.root.join("Gemfile.lock");
    ctx.install_fixture("Sources.Gemfile.lock", &path)?;

    let output = ctx.run_gemlock(&env, &["parse", "Gemfile.lock"], &env.root)?;
    output.assert_success()?;
    output.assert_stdout_contains("GIT https://github.com/rails/rails.git")?;
    output.assert_stdout_contains("  branch: main")?;
    output.assert_stdout_contains("PATH .")?;
    output.assert_stdout_contains("    rack (~> 2.2)")?;
    output.assert_stdout_contains("PLATFORMS\n  ruby, x86_64-linux")?;
    output.assert_stdout_contains("  rails!")?;
    Ok(())
}

fn scenario_parse_json(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("parse-json")?;
    let path = rails_lockfile(ctx, &env)?;

    let output = ctx.run_gemlock(&env, &["parse", &path, "--json"], &env.root)?;
    output.assert_success()?;
    let value = output.json()?;

    let source = &value["lockfile"]["sources"][0];
    if source["kind"] != "rubygems" {
        return Err(format!("Unexpected source kind: {}", source["kind"]));
    }
    let specs = source["specs"]
        .as_array()
        .ok_or_else(|| "specs is not an array".to_string())?;
    if specs.len() != 27 {
        return Err(format!("Expected 27 specs, got {}", specs.len()));
    }
    if specs[0]["dependencies"][2]["version"] != "(~> 2.5, >= 2.5.4)" {
        return Err(format!("Unexpected mail constraint: {}", specs[0]));
    }
    if value["lockfile"]["dependencies"][0]["name"] != "rails" {
        return Err("Expected rails as the only top-level dependency".to_string());
    }
    Ok(())
}

fn scenario_parse_nearest(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("parse-nearest")?;
    rails_lockfile(ctx, &env)?;
    let nested = env.root.join("app").join("models");
    ensure_dir(&nested)?;

    let output = ctx.run_gemlock(&env, &["parse"], &nested)?;
    output.assert_success()?;
    output.assert_stdout_contains("GEM https://rubygems.org/")?;
    output.assert_stdout_contains("  tzinfo 1.2.2")?;
    Ok(())
}

fn scenario_parse_no_lockfile(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("parse-none")?;
    write_file(
        &env.xdg_config.join("gemlock").join("config.toml"),
        "lockfile_names = [\"gemlock-test-absent.lock\"]\n",
    )?;

    let output = ctx.run_gemlock(&env, &["parse"], &env.root)?;
    output.assert_failure()?;
    output.assert_stderr_contains("No Gemfile.lock found")?;
    Ok(())
}

fn scenario_parse_malformed(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("parse-malformed")?;
    let path = env.root.join("Gemfile.lock");
    ctx.install_fixture("ThreeSpaceIndent.Gemfile.lock", &path)?;

    let output = ctx.run_gemlock(&env, &["parse", "Gemfile.lock"], &env.root)?;
    output.assert_failure()?;
    output.assert_stderr_contains("line 4, column 4: expected gem specification line")?;
    output.assert_stderr_contains("   rake (13.0.6)")?;
    if !output.stdout.is_empty() {
        return Err(format!("Expected no stdout, got: {}", output.stdout));
    }
    Ok(())
}

fn scenario_find(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("find")?;
    rails_lockfile(ctx, &env)?;

    let output = ctx.run_gemlock(&env, &["find", "ActionMailer"], &env.root)?;
    output.assert_success()?;
    if output.stdout.trim() != "actionmailer 4.1.7" {
        return Err(format!("Unexpected find output: {}", output.stdout));
    }
    Ok(())
}

fn scenario_find_json(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("find-json")?;
    let path = env.root.join("vendor").join("Gemfile.lock");
    ctx.install_fixture("Sources.Gemfile.lock", &path)?;
    let path = path.display().to_string();

    let output = ctx.run_gemlock(
        &env,
        &["find", "rails", "--lockfile", &path, "--json"],
        &env.root,
    )?;
    output.assert_success()?;
    let value = output.json()?;
    if value["version"] != "7.2.0" || value["source"] != "GIT" {
        return Err(format!("Unexpected find result: {}", value));
    }
    if value["remote"] != "https://github.com/rails/rails.git" {
        return Err(format!("Unexpected remote: {}", value["remote"]));
    }
    Ok(())
}

fn scenario_find_missing(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("find-missing")?;
    rails_lockfile(ctx, &env)?;

    let output = ctx.run_gemlock(&env, &["find", "sinatra"], &env.root)?;
    output.assert_failure()?;
    output.assert_stderr_contains("Gem 'sinatra' not found in lockfile")?;
    Ok(())
}

fn scenario_deps(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("deps")?;
    let path = env.root.join("Gemfile.lock");
    ctx.install_fixture("Sources.Gemfile.lock", &path)?;

    let output = ctx.run_gemlock(&env, &["deps"], &env.root)?;
    output.assert_success()?;
    let names: Vec<&str> = output.stdout.lines().collect();
    if names != ["myapp", "rack", "rails"] {
        return Err(format!("Unexpected deps output: {:?}", names));
    }
    Ok(())
}

fn scenario_uses(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("uses")?;
    rails_lockfile(ctx, &env)?;

    let output = ctx.run_gemlock(&env, &["uses", "rack"], &env.root)?;
    output.assert_success()?;
    output.assert_stdout_contains("actionpack 4.1.7 requires (~> 1.5.2)")?;
    output.assert_stdout_contains("rack-test 0.6.2 requires (>= 1.0)")?;
    output.assert_stdout_contains("sprockets 2.12.3 requires (~> 1.0)")?;
    output.assert_stdout_not_contains("rails 4.1.7")?;
    Ok(())
}

fn scenario_uses_none(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("uses-none")?;
    rails_lockfile(ctx, &env)?;

    let output = ctx.run_gemlock(&env, &["uses", "rails"], &env.root)?;
    output.assert_success()?;
    output.assert_stdout_contains("No gems depend on rails")?;
    Ok(())
}

fn scenario_check_mixed(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("check-mixed")?;
    ctx.install_fixture("Malformed.Gemfile.lock", &env.root.join("bad.lock"))?;
    ctx.install_fixture("Minimal.Gemfile.lock", &env.root.join("good.lock"))?;

    let output = ctx.run_gemlock(&env, &["check", "bad.lock", "good.lock"], &env.root)?;
    output.assert_failure()?;
    output.assert_stdout_contains("FAIL bad.lock: line 1, column 1")?;
    output.assert_stdout_contains("ok   good.lock (1 specs)")?;
    output.assert_stderr_contains("1 of 2 lockfiles failed to parse")?;
    Ok(())
}

fn scenario_check_json(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("check-json")?;
    ctx.install_fixture("ThreeSpaceIndent.Gemfile.lock", &env.root.join("bad.lock"))?;
    ctx.install_fixture("Rails.Gemfile.lock", &env.root.join("good.lock"))?;

    let output = ctx.run_gemlock(
        &env,
        &["check", "good.lock", "bad.lock", "--json"],
        &env.root,
    )?;
    output.assert_failure()?;
    let value = output.json()?;
    if value["failed"] != 1 {
        return Err(format!("Expected one failure, got {}", value["failed"]));
    }
    let files = &value["files"];
    if files[0]["ok"] != true || files[0]["specs"] != 27 {
        return Err(format!("Unexpected entry for good.lock: {}", files[0]));
    }
    if files[1]["ok"] != false || files[1]["line"] != 4 || files[1]["column"] != 4 {
        return Err(format!("Unexpected entry for bad.lock: {}", files[1]));
    }
    Ok(())
}

fn scenario_check_config_watch(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("check-watch")?;
    let first = env.root.join("a").join("Gemfile.lock");
    let second = env.root.join("b").join("Gemfile.lock");
    ctx.install_fixture("Minimal.Gemfile.lock", &first)?;
    ctx.install_fixture("Sources.Gemfile.lock", &second)?;

    // Literal TOML strings keep Windows backslashes intact
    let config = format!(
        "watch = ['{}', '{}']\n",
        first.display(),
        second.display()
    );
    write_file(&env.xdg_config.join("gemlock").join("config.toml"), &config)?;

    let output = ctx.run_gemlock(&env, &["check"], &env.root)?;
    output.assert_success()?;
    output.assert_stdout_contains("(1 specs)")?;
    output.assert_stdout_contains("(3 specs)")?;
    Ok(())
}

fn scenario_config_flag(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("config-flag")?;
    let path = env.root.join("gems.locked");
    ctx.install_fixture("Minimal.Gemfile.lock", &path)?;
    let config_path = env.root.join("gemlock.toml");
    write_file(&config_path, "lockfile_names = [\"gems.locked\"]\n")?;
    let config_path = config_path.display().to_string();

    let output = ctx.run_gemlock(&env, &["--config", &config_path, "find", "rake"], &env.root)?;
    output.assert_success()?;
    output.assert_stdout_contains("rake 13.0.6")?;

    let missing = ctx.run_gemlock(&env, &["find", "rake"], &env.root)?;
    missing.assert_failure()?;
    missing.assert_stderr_contains("No Gemfile.lock found")?;
    Ok(())
}

fn scenario_invalid_config(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("invalid-config")?;
    rails_lockfile(ctx, &env)?;
    write_file(
        &env.xdg_config.join("gemlock").join("config.toml"),
        "lockfile = \"Gemfile.lock\"\n",
    )?;

    let output = ctx.run_gemlock(&env, &["deps"], &env.root)?;
    output.assert_failure()?;
    output.assert_stderr_contains("Failed to parse config file")?;
    Ok(())
}

fn scenario_verbose(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("verbose")?;
    rails_lockfile(ctx, &env)?;

    let output = ctx.run_gemlock(&env, &["deps", "-v"], &env.root)?;
    output.assert_success()?;
    output.assert_stderr_contains("parsed Gemfile.lock")?;
    if output.stdout.trim() != "rails" {
        return Err(format!("Unexpected deps output: {}", output.stdout));
    }
    Ok(())
}
