use anyhow::Context;
use clap::Parser;
use shop_fix::{batch, build_matcher, cli, config, fixer, logging};
use cli::{Cli, Commands};
use config::Config;
use shop_fix_common::MatchDecision;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Fix { ref input, ref output, ref report, report_format } => {
            println!("🏪 shop-fix - 店舗名置換\n");

            let settings = config.resolve(&cli.overrides())?;
            let matcher = build_matcher(&settings)
                .with_context(|| format!("辞書の読み込みに失敗: {}", settings.dictionary.display()))?;
            println!("✔ 標準店舗名 {}件を読み込み", matcher.dictionary().len());

            let result = fixer::process_file(
                input,
                output,
                report.as_deref().map(|path| (path, report_format)),
                &settings.pattern,
                &matcher,
            )
            .with_context(|| format!("処理に失敗: {}", input.display()))?;

            let summary = &result.summary;
            println!("✔ 対象フィールド: {}件", summary.total_fields);
            println!("  一致: {}件（置換 {}件）", summary.matched_count, summary.replaced_count);
            println!("  不一致: {}件", summary.unmatched_count);
            if summary.skipped_count > 0 {
                println!("  スキップ: {}件", summary.skipped_count);
            }
            println!("✔ 結果を保存: {}", output.display());
            if let Some(path) = report {
                println!("✔ レポートを保存: {}", path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Batch { ref input_dir, ref output_dir } => {
            println!("🚀 shop-fix - 一括処理\n");

            let settings = config.resolve(&cli.overrides())?;
            let matcher = build_matcher(&settings)
                .with_context(|| format!("辞書の読み込みに失敗: {}", settings.dictionary.display()))?;
            println!("✔ 標準店舗名 {}件を読み込み\n", matcher.dictionary().len());

            let report = batch::process_folder(input_dir, output_dir, &settings.pattern, &matcher, true)?;

            let summary = &report.batch_summary;
            for file in &report.individual_reports {
                println!("  {}: 置換 {}件", file.file_info.input_file, file.summary.replaced_count);
            }
            for failure in &report.failures {
                println!("  ⚠ {}: {}", failure.input_file, failure.error);
            }

            println!("\n総ファイル数: {}", summary.total_files_processed);
            println!("成功/失敗: {}/{}", summary.succeeded_files, summary.failed_files);
            println!("総置換数: {}", summary.total_replacements_across_all_files);
            println!("集計レポート: {}", output_dir.join(batch::SUMMARY_FILE_NAME).display());

            println!("\n✅ 一括処理完了");
        }

        Commands::Score { ref name, top } => {
            let settings = config.resolve(&cli.overrides())?;
            let matcher = build_matcher(&settings)?;

            println!("入力: {}", name);
            println!("閾値: Levenshtein {:.2} / Jaro-Winkler {:.2}\n", settings.thresholds.lev(), settings.thresholds.jw());
            for (rank, candidate) in matcher.rank(name, top).iter().enumerate() {
                println!(
                    "  {}. {} (Levenshtein {:.3}, Jaro-Winkler {:.3})",
                    rank + 1,
                    candidate.candidate,
                    candidate.score.edit_score,
                    candidate.score.phonetic_score
                );
            }

            match matcher.find_best_match(name) {
                MatchDecision::Matched { candidate, .. } => println!("\n→ 一致: {}", candidate),
                MatchDecision::Unmatched { .. } => println!("\n→ 一致なし（置換しない）"),
            }
        }

        Commands::Config { show, set_lev_threshold, set_jw_threshold, set_field_pattern, set_dictionary } => {
            let mut config = config;
            let changed = set_lev_threshold.is_some()
                || set_jw_threshold.is_some()
                || set_field_pattern.is_some()
                || set_dictionary.is_some();

            if let Some(v) = set_lev_threshold {
                config.lev_threshold = v;
            }
            if let Some(v) = set_jw_threshold {
                config.jw_threshold = v;
            }
            if let Some(v) = set_field_pattern {
                config.field_pattern = v.to_string();
            }
            if let Some(v) = set_dictionary {
                config.dictionary = Some(v);
            }

            if changed {
                // 不正な値は保存しない
                config.resolve(&Default::default())?;
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!(
                    "  辞書: {}",
                    config
                        .dictionary
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| format!("{} (デフォルト)", config::DEFAULT_DICTIONARY))
                );
                println!("  Levenshtein閾値: {}", config.lev_threshold);
                println!("  Jaro-Winkler閾値: {}", config.jw_threshold);
                println!("  フィールドパターン: {}", config.field_pattern);
            }
        }
    }

    Ok(())
}
