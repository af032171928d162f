use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;
use vt_core::{
    DownloadArtifact, Entity, LoadOrigin, Notice, ProductDraft, ProductFilter, Repository,
    UserDraft, ValidationErrors, Wizard, is_promotion, products_chain, users_chain,
};
use vt_source::Fetcher;
use vt_storage::FileStore;
use vt_types::{Price, Product, SubmissionDraft, User};

use crate::config::Settings;

pub(crate) struct App<F> {
    settings: Settings,
    fetcher: Rc<F>,
    store: Rc<FileStore>,
}

fn print_notice(notice: &Notice) {
    eprintln!("notice [{}]: {}", notice.source, notice.message);
}

impl<F: Fetcher + 'static> App<F> {
    pub(crate) fn open(settings: Settings, fetcher: F) -> Result<Self> {
        let store = FileStore::open(&settings.data_dir)?;
        Ok(Self {
            settings,
            fetcher: Rc::new(fetcher),
            store: Rc::new(store),
        })
    }

    pub(crate) async fn products(&self) -> (Repository<Product, Rc<FileStore>>, LoadOrigin) {
        let chain = products_chain(self.fetcher.clone(), &self.settings.sources);
        let mut repo = Repository::new(self.store.clone());
        let origin = repo.load(&chain, &print_notice).await;
        info!(?origin, count = repo.len(), "products ready");
        (repo, origin)
    }

    pub(crate) async fn users(&self) -> (Repository<User, Rc<FileStore>>, LoadOrigin) {
        let chain = users_chain(self.fetcher.clone(), &self.settings.sources);
        let mut repo = Repository::new(self.store.clone());
        let origin = repo.load(&chain, &print_notice).await;
        info!(?origin, count = repo.len(), "users ready");
        (repo, origin)
    }

    pub(crate) async fn add_product(&self, draft: &ProductDraft) -> Result<Product, ValidationErrors> {
        let (mut repo, _) = self.products().await;
        repo.add(draft).cloned()
    }

    pub(crate) async fn add_user(&self, draft: &UserDraft) -> Result<User, ValidationErrors> {
        let (mut repo, _) = self.users().await;
        repo.add(draft).cloned()
    }

    pub(crate) async fn remove_product(
        &self,
        index: usize,
        confirm: impl FnOnce(&Product) -> bool,
    ) -> Option<Product> {
        let (mut repo, _) = self.products().await;
        repo.remove_at(index, confirm)
    }

    pub(crate) async fn remove_user(&self, index: usize, confirm: impl FnOnce(&User) -> bool) -> Option<User> {
        let (mut repo, _) = self.users().await;
        repo.remove_at(index, confirm)
    }

    pub(crate) fn wizard(&self) -> Result<Wizard<Rc<FileStore>, FileStore>> {
        let session = FileStore::open(self.settings.session_dir())?;
        Ok(Wizard::new(self.store.clone(), session))
    }
}

/// Confirm a submission and write the download artifact into `out_dir`.
pub(crate) fn confirm_submission(
    wizard: &mut Wizard<Rc<FileStore>, FileStore>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let DownloadArtifact { file_name, contents } = wizard.confirm()?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

pub(crate) fn render_price(price: &Price) -> String {
    match price {
        Price::Number(n) => format!("{n:.2}"),
        Price::Text(raw) if raw.trim().is_empty() => "-".to_owned(),
        Price::Text(raw) => raw.clone(),
    }
}

pub(crate) fn render_product(index: usize, product: &Product) -> String {
    let badge = if is_promotion(&product.price) { " [PROMO]" } else { "" };
    format!(
        "{index:>3}  {}{badge}  {}  {} / {}",
        product.title,
        render_price(&product.price),
        or_dash(&product.brand),
        or_dash(&product.category),
    )
}

pub(crate) fn render_user(index: usize, user: &User) -> String {
    format!("{index:>3}  {}  <{}>  {}", user.full_name(), user.email, user.age)
}

pub(crate) fn render_filtered(products: &[Product], filter: &ProductFilter) -> Vec<String> {
    filter
        .apply(products)
        .into_iter()
        .map(|(index, product)| render_product(index, product))
        .collect()
}

pub(crate) fn confirm_prompt<T: Entity>(kind: &str, assume_yes: bool) -> impl FnOnce(&T) -> bool {
    move |item: &T| {
        if assume_yes {
            return true;
        }
        eprint!("Remove {kind} \"{}\"? [y/N] ", item.label());
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim")
    }
}

pub(crate) fn render_draft(draft: &SubmissionDraft) -> Vec<String> {
    vec![
        format!("nome:      {}", draft.nome),
        format!("sobrenome: {}", draft.sobrenome),
        format!("email:     {}", draft.email),
        format!("idade:     {}", draft.idade),
    ]
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
