use testrc_utils::types::ConfigSource;

use crate::defaults::{DEFAULTED_OPTIONS, default_value};
use crate::names::{OptionName, RUN_FLAGS};
use crate::normalize::{coerce_flag, fill_screenshots, merge_compiler_options};
use crate::value::OptionValue;

use super::TestConfiguration;

impl TestConfiguration {
    /// Final pass before the configuration is handed to the runner.
    ///
    /// Coerces the run flags, fills catalog defaults, fills the screenshots
    /// object field by field and resolves compiler options. Everything this
    /// pass creates is attributed to `Config` and marked as filled, so a
    /// later runtime merge does not report it as overridden. Values that are
    /// already set keep their source.
    pub fn prepare(&mut self) {
        self.prepare_flags();
        self.prepare_defaults();
        self.prepare_screenshots();
        self.prepare_compiler_options();
        tracing::debug!(options = self.options.len(), "Prepared configuration");
    }

    fn prepare_flags(&mut self) {
        for name in RUN_FLAGS {
            let flag = coerce_flag(self.options.value(name));
            self.write_back(*name, flag);
        }
    }

    fn prepare_defaults(&mut self) {
        for name in DEFAULTED_OPTIONS {
            if let Some(default) = default_value(*name) {
                self.ensure_option(*name, || OptionValue::Json(default));
            }
        }
    }

    fn ensure_option(&mut self, name: OptionName, default: impl FnOnce() -> OptionValue) {
        let options = std::mem::take(&mut self.options);
        let (options, _) = options.ensure(name, default, ConfigSource::Config);
        self.options = options;
    }

    fn prepare_screenshots(&mut self) {
        let screenshots = fill_screenshots(
            self.options.json(OptionName::Screenshots),
            &self.working_dir,
        );
        self.write_back(OptionName::Screenshots, screenshots);
    }

    fn prepare_compiler_options(&mut self) {
        let ts_config_path = self
            .options
            .json(OptionName::TsConfigPath)
            .and_then(serde_json::Value::as_str);
        let compiler_options =
            merge_compiler_options(self.options.json(OptionName::CompilerOptions), ts_config_path);
        self.write_back(OptionName::CompilerOptions, compiler_options);
    }
}
