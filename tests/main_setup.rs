use campus_nav::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: [&str; 3] = ["APP_ENV", "BIND_ADDR", "MAX_REDIRECTS"];

/// Runs a test and restores the configuration variables afterward, even if it panics.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> =
        CONFIG_VARS.iter().map(|&var| (var, env::var(var).ok())).collect();

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            for var in CONFIG_VARS {
                env::remove_var(var);
            }
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.max_redirects, 8);
}

#[test]
#[serial]
fn test_app_config_production_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
            env::set_var("MAX_REDIRECTS", "3");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.max_redirects, 3);
}

#[test]
#[serial]
fn test_app_config_unknown_env_falls_back_to_local() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "staging");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
}

#[test]
#[serial]
fn test_app_config_invalid_redirect_limit_fail_fast() {
    for raw in ["zero", "0", "-1"] {
        let result = run_with_env(|| {
            panic::catch_unwind(|| {
                unsafe {
                    env::set_var("MAX_REDIRECTS", raw);
                }
                AppConfig::load()
            })
        });

        assert!(result.is_err(), "MAX_REDIRECTS={raw} should panic");
    }
}
