// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use weather_widget_common::config::WidgetConfig;
use weather_widget_common::display::DisplaySlots;
use weather_widget_common::refresher::DisplayRefresher;
use weather_widget_common::sensor::SensorProviderPointer;

type SharedRefresher = Rc<RefCell<DisplayRefresher<SensorProviderPointer>>>;

/// Error that ended the refresh cycle, handed from the timer back to `App::run`.
type SharedFailure = Rc<RefCell<Option<anyhow::Error>>>;

/// Our App struct that holds the UI, the refresher and its timer.
///
/// Each tick reads the sensor, writes the four display slots and then arms the
/// single-shot timer with the period read in that tick. The timer callback runs on the UI
/// thread, so a tick always finishes before the next one can start.
struct App {
    ui: AppWindow,
    refresher: SharedRefresher,
    timer: Rc<slint::Timer>,
    failure: SharedFailure,
}

impl App {
    const ICON_EXTENSIONS: [&'static str; 2] = ["svg", "png"];

    /// Create a new App struct.
    ///
    /// Picks the sensor provider from the config and loads custom icons, if any.
    fn new(config: &WidgetConfig) -> anyhow::Result<Self> {
        // Make a new AppWindow
        let ui = AppWindow::new()?;

        if let Some(icon_dir) = &config.icon_dir {
            Self::load_icons(&ui, icon_dir)?;
        }

        let refresher = Rc::new(RefCell::new(DisplayRefresher::new(
            config.sensor_provider()?,
        )));

        // Clicking the period label steps the update period, where the provider supports it.
        let cycle_refresher = refresher.clone();
        ui.global::<ViewModel>().on_cycle_period(move || {
            match cycle_refresher.borrow_mut().provider_mut().cycle_period() {
                Ok(true) => {}
                Ok(false) => log::info!("Update period not changed"),
                Err(e) => log::error!("Failed to change update period: {e}"),
            }
        });

        Ok(Self {
            ui,
            refresher,
            timer: Rc::new(slint::Timer::default()),
            failure: SharedFailure::default(),
        })
    }

    /// Replaces the built-in icons with the ones found in `icon_dir`.
    fn load_icons(ui: &AppWindow, icon_dir: &Path) -> anyhow::Result<()> {
        let model = ui.global::<ViewModel>();

        model.set_temperature_icon(Self::load_icon(icon_dir, "temperature")?);
        model.set_pressure_icon(Self::load_icon(icon_dir, "pressure")?);
        model.set_humidity_icon(Self::load_icon(icon_dir, "humidity")?);

        Ok(())
    }

    fn load_icon(icon_dir: &Path, name: &str) -> anyhow::Result<slint::Image> {
        let path = Self::ICON_EXTENSIONS
            .iter()
            .map(|extension| icon_dir.join(name).with_extension(extension))
            .find(|path| path.exists())
            .ok_or_else(|| anyhow::anyhow!("No {name} icon in {}", icon_dir.display()))?;

        log::debug!("Loading icon {}", path.display());
        slint::Image::load_from_path(&path)
            .map_err(|_| anyhow::anyhow!("Failed to load icon {}", path.display()))
    }

    fn show(ui: &AppWindow, slots: DisplaySlots) {
        let model = ui.global::<ViewModel>();

        model.set_temperature(slots.temperature.into());
        model.set_humidity(slots.humidity.into());
        model.set_pressure(slots.pressure.into());
        model.set_period(slots.period.into());
    }

    /// Runs one tick and arms the timer for the next one.
    ///
    /// A sensor error stops the timer and quits the event loop.
    fn refresh(
        ui_handle: &slint::Weak<AppWindow>,
        refresher: &SharedRefresher,
        timer: &Rc<slint::Timer>,
        failure: &SharedFailure,
    ) {
        let tick = match refresher.borrow_mut().tick() {
            Ok(tick) => tick,
            Err(e) => {
                log::error!("Sensor read failed: {e}");
                timer.stop();
                failure.borrow_mut().replace(e.into());
                let _ = slint::quit_event_loop();
                return;
            }
        };

        let Some(ui) = ui_handle.upgrade() else {
            return;
        };
        Self::show(&ui, tick.slots);

        // Arm the next tick only after the slots are written, so the wait starts now.
        let ui_handle = ui_handle.clone();
        let refresher = refresher.clone();
        let failure = failure.clone();
        let timer_handle = Rc::downgrade(timer);

        timer.start(slint::TimerMode::SingleShot, tick.delay, move || {
            if let Some(timer) = timer_handle.upgrade() {
                Self::refresh(&ui_handle, &refresher, &timer, &failure);
            }
        });
    }

    /// Run the App: show the first reading right away, then refresh on the timer.
    fn run(&mut self) -> anyhow::Result<()> {
        Self::refresh(&self.ui.as_weak(), &self.refresher, &self.timer, &self.failure);

        if let Some(e) = self.failure.borrow_mut().take() {
            return Err(e);
        }

        // Run the UI (and map an error to an anyhow::Error).
        self.ui.run()?;

        match self.failure.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// A minimal main function that loads the config, initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = WidgetConfig::load()?;
    let mut app = App::new(&config)?;

    app.run()
}
