fn main() -> color_eyre::Result<()> {
    scribe::run()
}
